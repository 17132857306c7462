//! Serializable summaries of an estimation run.

use crate::math::stats::StatsHelper;
use crate::prelude::{CztBand, EstimationError, EstimationResult};
use crate::subspace::decomposition::SingularValueSummary;
use crate::telemetry::Metrics;
use ndarray::ArrayView1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A local maximum of a spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPeak {
    pub frequency_hz: f64,
    pub value: f64,
}

/// One pseudospectrum row with its strongest peaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudospectrumTrace {
    pub p: usize,
    pub values: Vec<f64>,
    pub peaks: Vec<SpectrumPeak>,
}

impl PseudospectrumTrace {
    pub fn from_row(p: usize, grid_hz: &[f64], row: ArrayView1<f64>, peak_count: usize) -> Self {
        let values = row.to_vec();
        let peaks = collect_peaks(grid_hz, &values, peak_count);
        Self { p, values, peaks }
    }
}

/// Magnitude of a chirp-z spectrum over its band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CztTrace {
    pub band: CztBand,
    pub frequencies_hz: Vec<f64>,
    pub magnitudes: Vec<f64>,
    pub peaks: Vec<SpectrumPeak>,
}

impl CztTrace {
    pub fn from_spectrum(band: CztBand, spectrum: ArrayView1<Complex64>, peak_count: usize) -> Self {
        let frequencies_hz = band.frequencies();
        let magnitudes: Vec<f64> = spectrum.iter().map(|v| v.norm()).collect();
        let peaks = collect_peaks(&frequencies_hz, &magnitudes, peak_count);
        Self {
            band,
            frequencies_hz,
            magnitudes,
            peaks,
        }
    }
}

/// Everything a caller needs to overlay the coarse and fine spectra of one signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumReport {
    pub sample_rate: f64,
    pub samples: usize,
    pub rows: usize,
    pub grid_hz: Vec<f64>,
    pub traces: Vec<PseudospectrumTrace>,
    pub singular_values: SingularValueSummary,
    pub czt: Option<CztTrace>,
    pub metrics: Metrics,
}

impl SpectrumReport {
    pub fn to_json(&self) -> EstimationResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| EstimationError::Internal(format!("serializing report: {}", err)))
    }
}

fn collect_peaks(frequencies: &[f64], values: &[f64], count: usize) -> Vec<SpectrumPeak> {
    StatsHelper::strongest_peaks(values, count)
        .into_iter()
        .map(|idx| SpectrumPeak {
            frequency_hz: frequencies[idx],
            value: values[idx],
        })
        .collect()
}
