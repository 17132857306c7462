use crate::prelude::{EstimationError, EstimationResult};
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;

/// Implicit QR sweeps allowed per matrix dimension before the SVD gives up.
pub const SVD_SWEEPS_PER_DIMENSION: usize = 64;

/// Raw singular value decomposition `(U, s, Vᴴ)`, in whatever order the backend produced.
pub type SvdFactors = (Array2<Complex64>, Array1<f64>, Array2<Complex64>);

/// Dense complex linear algebra used by the estimators.
///
/// Implementations decide where the arrays live; callers only see ndarray views.
pub trait LinalgBackend: Send + Sync {
    fn matmul(&self, lhs: ArrayView2<Complex64>, rhs: ArrayView2<Complex64>) -> Array2<Complex64>;
    fn svd(&self, matrix: ArrayView2<Complex64>) -> EstimationResult<SvdFactors>;
}

/// Host backend: ndarray for products, nalgebra for the SVD.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl LinalgBackend for CpuBackend {
    fn matmul(&self, lhs: ArrayView2<Complex64>, rhs: ArrayView2<Complex64>) -> Array2<Complex64> {
        lhs.dot(&rhs)
    }

    fn svd(&self, matrix: ArrayView2<Complex64>) -> EstimationResult<SvdFactors> {
        if matrix.iter().any(|v| !v.re.is_finite() || !v.im.is_finite()) {
            return Err(EstimationError::Decomposition(
                "matrix has non-finite entries".into(),
            ));
        }
        let (rows, cols) = matrix.dim();
        let dense = DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]);
        let max_niter = SVD_SWEEPS_PER_DIMENSION * rows.max(cols).max(1);
        let svd = SVD::try_new(dense, true, true, f64::EPSILON, max_niter).ok_or_else(|| {
            EstimationError::Decomposition(format!(
                "SVD did not converge within {} iterations",
                max_niter
            ))
        })?;

        let u = svd
            .u
            .ok_or_else(|| EstimationError::Decomposition("left singular vectors missing".into()))?;
        let v_t = svd.v_t.ok_or_else(|| {
            EstimationError::Decomposition("right singular vectors missing".into())
        })?;

        let u = Array2::from_shape_fn(u.shape(), |(i, j)| u[(i, j)]);
        let vh = Array2::from_shape_fn(v_t.shape(), |(i, j)| v_t[(i, j)]);
        let s = svd.singular_values.iter().copied().collect::<Array1<f64>>();
        Ok((u, s, vh))
    }
}

/// Conjugate transpose of `matrix`.
pub fn conjugate_transpose(matrix: ArrayView2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|v| v.conj())
}

/// `J · Aᵗ · J`, with `J` the exchange (anti-identity) matrix.
pub fn exchange_transpose(matrix: ArrayView2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = matrix.dim();
    Array2::from_shape_fn((cols, rows), |(i, j)| {
        matrix[[rows - 1 - j, cols - 1 - i]]
    })
}

/// Largest absolute deviation between `matrix` and its conjugate transpose.
pub fn hermitian_deviation(matrix: ArrayView2<Complex64>) -> f64 {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return f64::INFINITY;
    }
    let mut worst = 0.0_f64;
    for i in 0..rows {
        for j in i..cols {
            worst = worst.max((matrix[[i, j]] - matrix[[j, i]].conj()).norm());
        }
    }
    worst
}
