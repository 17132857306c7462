pub struct StatsHelper;

impl StatsHelper {
    /// Median of the finite values; `None` when there are none.
    pub fn median(samples: &[f64]) -> Option<f64> {
        let mut finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);
        let mid = finite.len() / 2;
        if finite.len() % 2 == 0 {
            Some(0.5 * (finite[mid - 1] + finite[mid]))
        } else {
            Some(finite[mid])
        }
    }

    /// Indices of strict interior local maxima.
    pub fn local_maxima(samples: &[f64]) -> Vec<usize> {
        if samples.len() < 3 {
            return Vec::new();
        }
        (1..samples.len() - 1)
            .filter(|&i| samples[i] > samples[i - 1] && samples[i] > samples[i + 1])
            .collect()
    }

    /// The `count` strongest local maxima, returned in ascending index order.
    pub fn strongest_peaks(samples: &[f64], count: usize) -> Vec<usize> {
        let mut peaks = Self::local_maxima(samples);
        peaks.sort_by(|&a, &b| samples[b].total_cmp(&samples[a]));
        peaks.truncate(count);
        peaks.sort_unstable();
        peaks
    }
}
