use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Number of signal-subspace dimensions to evaluate.
///
/// A single dimension yields a one-dimensional pseudospectrum; a list yields one row per
/// entry, in the order given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimensions {
    One(usize),
    Many(Vec<usize>),
}

impl Dimensions {
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Dimensions::One(p) => std::slice::from_ref(p),
            Dimensions::Many(list) => list,
        }
    }
}

impl From<usize> for Dimensions {
    fn from(p: usize) -> Self {
        Dimensions::One(p)
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(list: Vec<usize>) -> Self {
        Dimensions::Many(list)
    }
}

impl From<&[usize]> for Dimensions {
    fn from(list: &[usize]) -> Self {
        Dimensions::Many(list.to_vec())
    }
}

/// Parameters of a MUSIC evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicConfig {
    /// Snapshot length, also the steering-vector length.
    pub rows: usize,
    #[serde(rename = "p")]
    pub dimensions: Dimensions,
    /// Sliding-window step; `None` splits the signal into disjoint blocks.
    #[serde(default)]
    pub snapshot_jump: Option<usize>,
    #[serde(default)]
    pub forward_backward: bool,
    #[serde(default)]
    pub signal_numerator: bool,
}

impl MusicConfig {
    pub fn new(rows: usize, dimensions: impl Into<Dimensions>) -> Self {
        Self {
            rows,
            dimensions: dimensions.into(),
            snapshot_jump: None,
            forward_backward: false,
            signal_numerator: false,
        }
    }

    pub fn with_snapshot_jump(mut self, jump: usize) -> Self {
        self.snapshot_jump = Some(jump);
        self
    }

    pub fn with_forward_backward(mut self, enabled: bool) -> Self {
        self.forward_backward = enabled;
        self
    }

    pub fn with_signal_numerator(mut self, enabled: bool) -> Self {
        self.signal_numerator = enabled;
        self
    }
}

/// Band evaluated by the chirp-z transform, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CztBand {
    pub f1: f64,
    pub f2: f64,
    pub bin_width: f64,
}

impl CztBand {
    pub fn new(f1: f64, f2: f64, bin_width: f64) -> Self {
        Self { f1, f2, bin_width }
    }

    /// Number of bins `floor((f2 - f1) / bin_width + 1)`.
    pub fn bins(&self) -> usize {
        ((self.f2 - self.f1) / self.bin_width + 1.0).floor() as usize
    }

    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.bins())
            .map(|i| self.f1 + i as f64 * self.bin_width)
            .collect()
    }
}

/// Evenly spaced frequency grid in Hz, inclusive of `stop_hz` when it lands on a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyGridSpec {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub step_hz: f64,
}

impl FrequencyGridSpec {
    pub fn frequencies_hz(&self) -> EstimationResult<Vec<f64>> {
        if !(self.step_hz > 0.0) || !self.step_hz.is_finite() {
            return Err(EstimationError::InvalidParameter(format!(
                "grid step must be positive, got {}",
                self.step_hz
            )));
        }
        if self.stop_hz < self.start_hz {
            return Err(EstimationError::InvalidParameter(format!(
                "grid stop {} precedes start {}",
                self.stop_hz, self.start_hz
            )));
        }
        let count = ((self.stop_hz - self.start_hz) / self.step_hz + 1e-9).floor() as usize + 1;
        Ok((0..count)
            .map(|i| self.start_hz + i as f64 * self.step_hz)
            .collect())
    }

    /// Grid expressed in cycles per sample.
    pub fn normalized(&self, sample_rate: f64) -> EstimationResult<Array1<f64>> {
        if !(sample_rate > 0.0) {
            return Err(EstimationError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(self
            .frequencies_hz()?
            .into_iter()
            .map(|f| f / sample_rate)
            .collect())
    }
}

/// Sampled signal handed to a processing stage.
#[derive(Debug, Clone)]
pub struct SignalInput {
    pub samples: Array1<Complex64>,
    pub sample_rate: f64,
}

impl SignalInput {
    pub fn new(samples: Array1<Complex64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

/// Common error type for every estimator in the crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("insufficient samples: need at least {required}, got {available}")]
    InsufficientSamples { required: usize, available: usize },
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),
    #[error("decomposition failed: {0}")]
    Decomposition(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type EstimationResult<T> = Result<T, EstimationError>;

/// Trait describing a configurable spectral-estimation stage.
pub trait ProcessingStage {
    type Config;
    type Output;

    fn initialize(&mut self, config: &Self::Config) -> EstimationResult<()>;
    fn execute(&mut self, input: &SignalInput) -> EstimationResult<Self::Output>;
    fn cleanup(&mut self);
}
