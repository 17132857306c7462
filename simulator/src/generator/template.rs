use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Complex exponential `amplitude * exp(j(2π f n / fs + phase))` of `length` samples.
pub fn complex_tone(
    length: usize,
    frequency: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Array1<Complex64> {
    (0..length)
        .map(|n| {
            Complex64::from_polar(amplitude, 2.0 * PI * frequency * n as f64 / sample_rate + phase)
        })
        .collect()
}

/// Phasor whose instantaneous frequency at sample `n` is `frequencies[n]` Hz.
///
/// Phase accumulates sample by sample, so a constant series reproduces [`complex_tone`].
pub fn swept_tone(
    frequencies: ArrayView1<f64>,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Array1<Complex64> {
    let step = 2.0 * PI / sample_rate;
    let mut accumulated = phase;
    frequencies
        .iter()
        .map(|&f| {
            let sample = Complex64::from_polar(amplitude, accumulated);
            accumulated += step * f;
            sample
        })
        .collect()
}
