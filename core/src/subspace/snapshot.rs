use crate::prelude::{EstimationError, EstimationResult};
use log::debug;
use ndarray::{Array2, ArrayView1};
use num_complex::Complex64;

/// Arranges a 1-D signal into a `rows × cols` snapshot matrix.
///
/// Without a jump the signal is cut into disjoint blocks of `rows` samples (the tail that
/// does not fill a block is dropped), one block per column. With a jump `j`, column `i`
/// is the window `signal[i*j .. i*j + rows]`.
pub fn build_snapshot_matrix(
    signal: ArrayView1<Complex64>,
    rows: usize,
    snapshot_jump: Option<usize>,
) -> EstimationResult<Array2<Complex64>> {
    if rows == 0 {
        return Err(EstimationError::InvalidParameter(
            "snapshot rows must be at least 1".into(),
        ));
    }
    if snapshot_jump == Some(0) {
        return Err(EstimationError::InvalidParameter(
            "snapshot jump must be at least 1".into(),
        ));
    }

    if let Some(idx) = signal
        .iter()
        .position(|v| !v.re.is_finite() || !v.im.is_finite())
    {
        return Err(EstimationError::InvalidParameter(format!(
            "signal sample {} is not finite",
            idx
        )));
    }

    let available = signal.len();
    if available < rows {
        return Err(EstimationError::InsufficientSamples {
            required: rows,
            available,
        });
    }

    let snapshots = match snapshot_jump {
        None => {
            let cols = available / rows;
            Array2::from_shape_fn((rows, cols), |(r, c)| signal[c * rows + r])
        }
        Some(jump) => {
            let cols = (available - rows) / jump + 1;
            Array2::from_shape_fn((rows, cols), |(r, c)| signal[c * jump + r])
        }
    };

    debug!(
        "snapshot matrix is {} x {}",
        snapshots.nrows(),
        snapshots.ncols()
    );
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn ramp(n: usize) -> Array1<Complex64> {
        (0..n).map(|i| Complex64::new(i as f64 + 1.0, 0.0)).collect()
    }

    #[test]
    fn disjoint_blocks_fill_columns_and_drop_tail() {
        let signal = ramp(7);
        let x = build_snapshot_matrix(signal.view(), 2, None).unwrap();
        assert_eq!(x.dim(), (2, 3));
        let re: Vec<f64> = x.column(0).iter().map(|v| v.re).collect();
        assert_eq!(re, vec![1.0, 2.0]);
        assert_eq!(x[[0, 2]].re, 5.0);
        assert_eq!(x[[1, 2]].re, 6.0);
    }

    #[test]
    fn sliding_window_advances_by_jump() {
        let signal = ramp(6);
        let x = build_snapshot_matrix(signal.view(), 2, Some(1)).unwrap();
        assert_eq!(x.dim(), (2, 5));
        assert_eq!(x[[0, 4]].re, 5.0);
        assert_eq!(x[[1, 4]].re, 6.0);

        let strided = build_snapshot_matrix(signal.view(), 3, Some(2)).unwrap();
        // floor((6 - 3) / 2) + 1
        assert_eq!(strided.dim(), (3, 2));
        assert_eq!(strided[[0, 1]].re, 3.0);
    }

    #[test]
    fn zero_jump_is_rejected() {
        let signal = ramp(6);
        assert!(matches!(
            build_snapshot_matrix(signal.view(), 2, Some(0)),
            Err(EstimationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut signal = ramp(8);
        signal[5] = Complex64::new(f64::NAN, 0.0);
        for jump in [None, Some(1)] {
            assert!(matches!(
                build_snapshot_matrix(signal.view(), 2, jump),
                Err(EstimationError::InvalidParameter(_))
            ));
        }
        signal[5] = Complex64::new(0.0, f64::NEG_INFINITY);
        assert!(build_snapshot_matrix(signal.view(), 2, Some(1)).is_err());
    }

    #[test]
    fn short_signal_reports_insufficient_samples() {
        let signal = ramp(3);
        for jump in [None, Some(1)] {
            assert_eq!(
                build_snapshot_matrix(signal.view(), 4, jump),
                Err(EstimationError::InsufficientSamples {
                    required: 4,
                    available: 3
                })
            );
        }
    }
}
