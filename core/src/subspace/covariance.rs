use crate::math::matrix::{conjugate_transpose, exchange_transpose, LinalgBackend};
use crate::prelude::{EstimationError, EstimationResult};
use log::debug;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

/// Sample covariance `Rx = X Xᴴ / cols` of a snapshot matrix.
///
/// With `forward_backward` the estimate is replaced by `(Rx + J Rxᵗ J) / 2`.
pub fn sample_covariance<B: LinalgBackend + ?Sized>(
    backend: &B,
    snapshots: ArrayView2<Complex64>,
    forward_backward: bool,
) -> EstimationResult<Array2<Complex64>> {
    let cols = snapshots.ncols();
    if cols == 0 {
        return Err(EstimationError::InvalidParameter(
            "snapshot matrix has no columns".into(),
        ));
    }

    let hermitian = conjugate_transpose(snapshots);
    let scale = 1.0 / cols as f64;
    let mut rx = backend.matmul(snapshots, hermitian.view());
    rx.mapv_inplace(|v| v * scale);

    if forward_backward {
        debug!("using forward-backward covariance");
        let flipped = exchange_transpose(rx.view());
        rx.zip_mut_with(&flipped, |a, b| *a = 0.5 * (*a + *b));
    }

    Ok(rx)
}
