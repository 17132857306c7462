use crate::math::fft::{smooth_length, FftHelper};
use crate::prelude::{CztBand, EstimationError, EstimationResult};
use log::debug;
use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Spectrum of `x` at `f1, f1 + bin_width, ...` up to `f2`, via Bluestein's chirp-z
/// transform.
///
/// Each output equals `Σ x[n] exp(-j 2π f n / fs)` at its bin frequency; the transform
/// is a single linear convolution evaluated with FFTs whose length factors into primes
/// no larger than 7.
pub fn chirp_z_transform(
    x: ArrayView1<Complex64>,
    f1: f64,
    f2: f64,
    bin_width: f64,
    fs: f64,
) -> EstimationResult<Array1<Complex64>> {
    validate(x.len(), f1, f2, bin_width, fs)?;

    let m = x.len();
    let k = CztBand::new(f1, f2, bin_width).bins();
    let mut fft = FftHelper::new(smooth_length(m + k));
    debug!("czt of {} samples into {} bins, nfft {}", m, k, fft.size());

    // Chirp over n in [-(m-1), max(k-1, m-1)], stored with offset m-1. Bins are spaced
    // exactly `bin_width` apart, so the last bin may fall short of `f2`.
    let span = (m - 1) + (k - 1).max(m - 1) + 1;
    let step = -2.0 * PI * bin_width / fs;
    let chirp: Vec<Complex64> = (0..span)
        .map(|i| {
            let n = i as f64 - (m as f64 - 1.0);
            Complex64::from_polar(1.0, step * n * n / 2.0)
        })
        .collect();

    let filter: Vec<Complex64> = chirp[..k - 1 + m].iter().map(|w| w.inv()).collect();
    let filter_spectrum = fft.forward(&filter);

    let start = 2.0 * PI * f1 / fs;
    let modulated: Vec<Complex64> = x
        .iter()
        .enumerate()
        .map(|(n, &sample)| {
            let shift = Complex64::from_polar(1.0, -start * n as f64);
            sample * shift * chirp[m + n - 1]
        })
        .collect();

    let mut spectrum = fft.forward(&modulated);
    spectrum
        .iter_mut()
        .zip(filter_spectrum.iter())
        .for_each(|(a, b)| *a *= *b);
    let convolved = fft.inverse(&spectrum);

    Ok(convolved[m - 1..m + k - 1]
        .iter()
        .zip(chirp[m - 1..m + k - 1].iter())
        .map(|(g, w)| g * w)
        .collect())
}

/// [`chirp_z_transform`] over a configured band.
pub fn chirp_z_band(
    x: ArrayView1<Complex64>,
    band: &CztBand,
    fs: f64,
) -> EstimationResult<Array1<Complex64>> {
    chirp_z_transform(x, band.f1, band.f2, band.bin_width, fs)
}

fn validate(len: usize, f1: f64, f2: f64, bin_width: f64, fs: f64) -> EstimationResult<()> {
    if !(bin_width > 0.0) || !bin_width.is_finite() {
        return Err(EstimationError::InvalidParameter(format!(
            "bin width must be positive, got {}",
            bin_width
        )));
    }
    if !(f2 > f1) || !f1.is_finite() || !f2.is_finite() {
        return Err(EstimationError::InvalidParameter(format!(
            "stop frequency {} must exceed start frequency {}",
            f2, f1
        )));
    }
    if !(fs > 0.0) || !fs.is_finite() {
        return Err(EstimationError::InvalidParameter(format!(
            "sample rate must be positive, got {}",
            fs
        )));
    }
    if len == 0 {
        return Err(EstimationError::InsufficientSamples {
            required: 1,
            available: 0,
        });
    }
    Ok(())
}
