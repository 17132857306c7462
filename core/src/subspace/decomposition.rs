use crate::math::matrix::{hermitian_deviation, LinalgBackend};
use crate::prelude::{EstimationError, EstimationResult};
use log::warn;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Allowed Hermitian deviation relative to the largest diagonal entry.
const HERMITIAN_TOLERANCE: f64 = 1e-9;

/// `U`, `s`, `Vᴴ` of a covariance matrix, singular values in descending order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubspaceDecomposition {
    pub u: Array2<Complex64>,
    pub s: Array1<f64>,
    pub vh: Array2<Complex64>,
}

impl SubspaceDecomposition {
    pub fn dimension(&self) -> usize {
        self.s.len()
    }

    pub fn summary(&self) -> SingularValueSummary {
        SingularValueSummary {
            dimension: self.dimension(),
            leading: self.s.iter().take(8).copied().collect(),
        }
    }
}

/// Serializable digest of the singular value spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingularValueSummary {
    pub dimension: usize,
    pub leading: Vec<f64>,
}

/// SVD of a square covariance matrix.
///
/// Rank-deficient inputs are fine; only convergence failures of the backend are errors.
pub fn decompose<B: LinalgBackend + ?Sized>(
    backend: &B,
    covariance: ArrayView2<Complex64>,
) -> EstimationResult<SubspaceDecomposition> {
    let (rows, cols) = covariance.dim();
    if rows != cols || rows == 0 {
        return Err(EstimationError::InvalidParameter(format!(
            "covariance must be square and non-empty, got {} x {}",
            rows, cols
        )));
    }
    if let Some(deviation) = excess_hermitian_deviation(covariance) {
        warn!(
            "covariance deviates from Hermitian by {:.3e}; U and V may differ",
            deviation
        );
    }

    let (u, s, vh) = backend.svd(covariance)?;
    if u.dim() != (rows, rows) || vh.dim() != (rows, rows) || s.len() != rows {
        return Err(EstimationError::Decomposition(format!(
            "backend returned U {:?}, s {}, Vh {:?} for a {} x {} input",
            u.dim(),
            s.len(),
            vh.dim(),
            rows,
            rows
        )));
    }

    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    Ok(SubspaceDecomposition {
        u: u.select(Axis(1), &order),
        s: order.iter().map(|&i| s[i].max(0.0)).collect(),
        vh: vh.select(Axis(0), &order),
    })
}

/// Hermitian deviation of `covariance` when it exceeds the tolerance scaled to its diagonal.
pub(crate) fn excess_hermitian_deviation(covariance: ArrayView2<Complex64>) -> Option<f64> {
    let scale = covariance
        .diag()
        .iter()
        .map(|v| v.norm())
        .fold(0.0_f64, f64::max);
    let deviation = hermitian_deviation(covariance);
    if deviation > HERMITIAN_TOLERANCE * scale {
        Some(deviation)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::CpuBackend;
    use crate::subspace::covariance::sample_covariance;
    use crate::subspace::snapshot::build_snapshot_matrix;
    use ndarray::Array1;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::PI;

    fn tone_with_noise(n: usize, freq: f64, noise: f64, seed: u64) -> Array1<Complex64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                Complex64::from_polar(1.0, 2.0 * PI * freq * i as f64)
                    + noise * Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            })
            .collect()
    }

    #[test]
    fn singular_values_descend_and_are_non_negative() {
        for seed in 0..4 {
            let signal = tone_with_noise(200, 0.1 + 0.05 * seed as f64, 0.2, seed);
            let x = build_snapshot_matrix(signal.view(), 8, Some(1)).unwrap();
            let rx = sample_covariance(&CpuBackend, x.view(), seed % 2 == 0).unwrap();
            let decomposition = decompose(&CpuBackend, rx.view()).unwrap();
            let s = decomposition.s.to_vec();
            assert!(s.iter().all(|&v| v >= 0.0));
            assert!(s.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn rank_deficient_covariance_is_tolerated() {
        // A noiseless single tone gives a rank-one covariance.
        let signal = tone_with_noise(64, 0.125, 0.0, 0);
        let x = build_snapshot_matrix(signal.view(), 6, Some(1)).unwrap();
        let rx = sample_covariance(&CpuBackend, x.view(), false).unwrap();
        let decomposition = decompose(&CpuBackend, rx.view()).unwrap();
        assert_eq!(decomposition.dimension(), 6);
        assert!(decomposition.s[0] > 1.0);
        assert!(decomposition.s[1] < 1e-9);
        assert_eq!(decomposition.u.dim(), (6, 6));
    }

    #[test]
    fn left_and_right_vectors_agree_for_well_conditioned_covariance() {
        let signal = tone_with_noise(300, 0.2, 0.5, 11);
        let x = build_snapshot_matrix(signal.view(), 5, Some(1)).unwrap();
        let rx = sample_covariance(&CpuBackend, x.view(), false).unwrap();
        let decomposition = decompose(&CpuBackend, rx.view()).unwrap();
        let v = decomposition.vh.t().mapv(|z| z.conj());
        for (a, b) in decomposition.u.iter().zip(v.iter()) {
            assert!((a - b).norm() < 1e-8);
        }
    }

    #[test]
    fn hermitian_tolerance_scales_with_diagonal() {
        let c = Complex64::new;
        let large = ndarray::array![
            [c(1e12, 0.0), c(3e11, 1e11)],
            [c(3e11, -1e11 + 1e-2), c(2e12, 0.0)]
        ];
        assert_eq!(excess_hermitian_deviation(large.view()), None);

        let unit = ndarray::array![[c(1.0, 0.0), c(0.3, 0.1)], [c(0.3, -0.1 + 1e-6), c(2.0, 0.0)]];
        let deviation = excess_hermitian_deviation(unit.view()).unwrap();
        assert!((deviation - 1e-6).abs() < 1e-12);

        let zero = Array2::<Complex64>::zeros((3, 3));
        assert_eq!(excess_hermitian_deviation(zero.view()), None);
    }

    #[test]
    fn non_square_input_is_rejected() {
        let rx = Array2::<Complex64>::zeros((3, 2));
        assert!(matches!(
            decompose(&CpuBackend, rx.view()),
            Err(EstimationError::InvalidParameter(_))
        ));
    }
}
