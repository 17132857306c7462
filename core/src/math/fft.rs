use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Largest radix accepted when choosing a transform length.
pub const MAX_RADIX: usize = 7;

/// Helper that wraps the `rustfft` planner for a fixed transform length.
pub struct FftHelper {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let scratch = vec![Complex64::zero(); scratch_len];
        Self {
            forward,
            inverse,
            scratch,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform of `input` zero-padded (or truncated) to the planned length.
    pub fn forward(&mut self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer = self.fit(input);
        self.forward
            .process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Inverse transform normalized by `1 / size`.
    pub fn inverse(&mut self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer = self.fit(input);
        self.inverse
            .process_with_scratch(&mut buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f64;
        buffer.iter_mut().for_each(|v| *v *= scale);
        buffer
    }

    fn fit(&self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().take(self.size).copied().collect();
        buffer.resize(self.size, Complex64::zero());
        buffer
    }
}

/// Largest prime factor of `n`; `n` itself for primes, 1 for `n <= 1`.
pub fn largest_prime_factor(mut n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut largest = 1;
    let mut divisor = 2;
    while divisor * divisor <= n {
        while n % divisor == 0 {
            largest = divisor;
            n /= divisor;
        }
        divisor += 1;
    }
    if n > 1 {
        largest = n;
    }
    largest
}

/// First length strictly above `floor` whose prime factors are all `<= MAX_RADIX`.
pub fn smooth_length(floor: usize) -> usize {
    let mut candidate = floor + 1;
    while largest_prime_factor(candidate) > MAX_RADIX {
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fft_helper_pads_to_planned_length() {
        let mut helper = FftHelper::new(8);
        let output = helper.forward(&[Complex64::new(1.0, 0.0)]);
        assert_eq!(helper.size(), 8);
        assert_eq!(output.len(), 8);
        assert!(output.iter().all(|v| (v - Complex64::new(1.0, 0.0)).norm() < 1e-12));
    }

    #[test]
    fn inverse_undoes_forward() {
        let mut helper = FftHelper::new(6);
        let input: Vec<Complex64> = (0..6)
            .map(|i| Complex64::new(i as f64, -(i as f64) * 0.5))
            .collect();
        let spectrum = helper.forward(&input);
        let restored = helper.inverse(&spectrum);
        for (a, b) in input.iter().zip(restored.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn prime_factors_are_found() {
        assert_eq!(largest_prime_factor(1), 1);
        assert_eq!(largest_prime_factor(2), 2);
        assert_eq!(largest_prime_factor(84), 7);
        assert_eq!(largest_prime_factor(97), 97);
        assert_eq!(largest_prime_factor(2 * 2 * 11), 11);
    }

    #[test]
    fn smooth_length_skips_large_primes() {
        // 11 and 13 are rejected, 14 = 2 * 7 is accepted.
        assert_eq!(smooth_length(10), 12);
        assert_eq!(smooth_length(12), 14);
        assert_eq!(smooth_length(13), 14);
        assert!(largest_prime_factor(smooth_length(1000)) <= MAX_RADIX);
    }
}
