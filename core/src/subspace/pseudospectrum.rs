use crate::math::matrix::LinalgBackend;
use crate::prelude::{Dimensions, EstimationError, EstimationResult};
use crate::subspace::decomposition::SubspaceDecomposition;
use log::warn;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use num_complex::Complex64;
use std::f64::consts::PI;

/// MUSIC pseudospectrum over a frequency grid.
///
/// `Single` answers a single dimension hypothesis; `Batch` carries one row per hypothesis
/// in the order they were requested.
#[derive(Debug, Clone, PartialEq)]
pub enum Pseudospectrum {
    Single(Array1<f64>),
    Batch(Array2<f64>),
}

impl Pseudospectrum {
    /// Row `index` of the result; index 0 is the only row of a `Single`.
    pub fn row(&self, index: usize) -> Option<ArrayView1<f64>> {
        match self {
            Pseudospectrum::Single(values) if index == 0 => Some(values.view()),
            Pseudospectrum::Single(_) => None,
            Pseudospectrum::Batch(values) if index < values.nrows() => {
                Some(values.index_axis(Axis(0), index))
            }
            Pseudospectrum::Batch(_) => None,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Pseudospectrum::Single(_) => 1,
            Pseudospectrum::Batch(values) => values.nrows(),
        }
    }

    /// Number of grid points in each row.
    pub fn len(&self) -> usize {
        match self {
            Pseudospectrum::Single(values) => values.len(),
            Pseudospectrum::Batch(values) => values.ncols(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fails unless every grid frequency is finite and within `[-1, 1]` cycles per sample.
pub fn validate_grid(grid: ArrayView1<f64>) -> EstimationResult<()> {
    match grid.iter().find(|f| f.is_nan() || f.abs() > 1.0) {
        Some(f) => Err(EstimationError::InvalidParameter(format!(
            "frequency grid must be normalized to [-1, 1], found {}",
            f
        ))),
        None => Ok(()),
    }
}

/// Fails unless every hypothesis satisfies `0 < p < rows`.
pub fn validate_dimensions(dimensions: &Dimensions, rows: usize) -> EstimationResult<()> {
    let list = dimensions.as_slice();
    if list.is_empty() {
        return Err(EstimationError::InvalidParameter(
            "at least one subspace dimension is required".into(),
        ));
    }
    match list.iter().find(|&&p| p == 0 || p >= rows) {
        Some(p) => Err(EstimationError::InvalidParameter(format!(
            "subspace dimension {} outside 0 < p < {}",
            p, rows
        ))),
        None => Ok(()),
    }
}

/// Vandermonde matrix `E[i, n] = exp(-j 2π f_i n)`, one row per grid frequency.
pub fn steering_matrix(grid: ArrayView1<f64>, rows: usize) -> Array2<Complex64> {
    Array2::from_shape_fn((grid.len(), rows), |(i, n)| {
        Complex64::from_polar(1.0, -2.0 * PI * grid[i] * n as f64)
    })
}

/// Evaluates the pseudospectrum for each hypothesis on a shared steering projection.
///
/// The projection `P = E U` is formed once; for hypothesis `p` the denominator is the
/// energy of `P` in the noise columns `p..`. With `signal_numerator`, the numerator is the
/// energy of `P` in the signal columns weighted by `s^-1/2`, which equals `E U_s s^-1/2`
/// under the assumption that `U = V`.
pub fn evaluate_pseudospectrum<B: LinalgBackend + ?Sized>(
    backend: &B,
    grid: ArrayView1<f64>,
    rows: usize,
    dimensions: &Dimensions,
    decomposition: &SubspaceDecomposition,
    signal_numerator: bool,
) -> EstimationResult<Pseudospectrum> {
    let projection = steering_projection(backend, grid, rows, dimensions, decomposition)?;
    let spectra = dimensions
        .as_slice()
        .iter()
        .map(|&p| {
            hypothesis_spectrum(projection.view(), &decomposition.s, p, signal_numerator)
        })
        .collect::<EstimationResult<Vec<_>>>()?;
    Ok(assemble(dimensions, grid.len(), spectra))
}

/// Validates the inputs and forms `E U` for the grid.
pub(crate) fn steering_projection<B: LinalgBackend + ?Sized>(
    backend: &B,
    grid: ArrayView1<f64>,
    rows: usize,
    dimensions: &Dimensions,
    decomposition: &SubspaceDecomposition,
) -> EstimationResult<Array2<Complex64>> {
    validate_grid(grid)?;
    validate_dimensions(dimensions, rows)?;
    if decomposition.dimension() != rows || decomposition.u.dim() != (rows, rows) {
        return Err(EstimationError::InvalidParameter(format!(
            "steering length {} does not match decomposition dimension {}",
            rows,
            decomposition.dimension()
        )));
    }

    let steering = steering_matrix(grid, rows);
    Ok(backend.matmul(steering.view(), decomposition.u.view()))
}

/// Shapes per-hypothesis spectra to match how the dimensions were requested.
pub(crate) fn assemble(
    dimensions: &Dimensions,
    grid_len: usize,
    spectra: Vec<Array1<f64>>,
) -> Pseudospectrum {
    let mut values = Array2::<f64>::zeros((spectra.len(), grid_len));
    for (mut row, spectrum) in values.axis_iter_mut(Axis(0)).zip(spectra.iter()) {
        row.assign(spectrum);
    }
    match dimensions {
        Dimensions::One(_) => Pseudospectrum::Single(values.index_axis_move(Axis(0), 0)),
        Dimensions::Many(_) => Pseudospectrum::Batch(values),
    }
}

pub(crate) fn hypothesis_spectrum(
    projection: ArrayView2<Complex64>,
    singular_values: &Array1<f64>,
    p: usize,
    signal_numerator: bool,
) -> EstimationResult<Array1<f64>> {
    let weights = if signal_numerator {
        Some(signal_weights(singular_values, p)?)
    } else {
        None
    };

    let mut degenerate = 0usize;
    let spectrum = projection
        .axis_iter(Axis(0))
        .map(|bins| {
            let denominator: f64 = bins.iter().skip(p).map(|v| v.norm_sqr()).sum();
            let numerator: f64 = match &weights {
                Some(w) => bins
                    .iter()
                    .zip(w.iter())
                    .map(|(v, &scale)| (*v * scale).norm_sqr())
                    .sum(),
                None => 1.0,
            };
            if denominator == 0.0 {
                degenerate += 1;
                f64::INFINITY
            } else {
                numerator / denominator
            }
        })
        .collect::<Array1<f64>>();

    if degenerate > 0 {
        warn!(
            "p = {}: {} grid points have a zero noise projection, reported as +inf",
            p, degenerate
        );
    }
    Ok(spectrum)
}

/// `s^-1/2` over the leading `p` singular values.
fn signal_weights(singular_values: &Array1<f64>, p: usize) -> EstimationResult<Vec<f64>> {
    singular_values
        .iter()
        .take(p)
        .enumerate()
        .map(|(idx, &value)| {
            if value > 0.0 {
                Ok(value.powf(-0.5))
            } else {
                Err(EstimationError::NumericalDegeneracy(format!(
                    "singular value {} of the signal subspace is zero",
                    idx
                )))
            }
        })
        .collect()
}

/// Counts non-finite entries, used to surface degenerate bins to telemetry.
pub fn count_degenerate(spectrum: &Pseudospectrum) -> usize {
    match spectrum {
        Pseudospectrum::Single(values) => values.iter().filter(|v| !v.is_finite()).count(),
        Pseudospectrum::Batch(values) => values.iter().filter(|v| !v.is_finite()).count(),
    }
}
