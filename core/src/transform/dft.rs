use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Direct evaluation of `Σ x[n] exp(-j 2π f n / fs)` at each frequency in `freqs`.
pub fn dft(x: ArrayView1<Complex64>, freqs: &[f64], fs: f64) -> Array1<Complex64> {
    freqs
        .iter()
        .map(|&freq| {
            let omega = -2.0 * PI * freq / fs;
            x.iter()
                .enumerate()
                .map(|(n, &sample)| sample * Complex64::from_polar(1.0, omega * n as f64))
                .sum::<Complex64>()
        })
        .collect()
}

/// Closed-form spectrum of an `n`-sample tone `A exp(j(2π f0 t + phase))` evaluated at
/// `freqs`, using the small-offset approximation of the leakage kernel.
///
/// At `f == f0` the kernel is replaced by its limit `n`.
pub fn tone_spectrum(
    f0: f64,
    freqs: &[f64],
    fs: f64,
    n: usize,
    phase: f64,
    amplitude: f64,
) -> Array1<Complex64> {
    let rotation = Complex64::from_polar(amplitude, phase);
    freqs
        .iter()
        .map(|&freq| {
            let offset = 2.0 * PI * (freq - f0) / fs;
            if offset == 0.0 {
                return rotation * n as f64;
            }
            let leakage =
                Complex64::new(1.0, 0.0) - Complex64::from_polar(1.0, -offset * n as f64);
            Complex64::new(0.0, -1.0) * leakage / offset * rotation
        })
        .collect()
}
