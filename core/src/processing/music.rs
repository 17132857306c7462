use crate::math::matrix::{CpuBackend, LinalgBackend};
use crate::prelude::{
    EstimationError, EstimationResult, FrequencyGridSpec, MusicConfig, ProcessingStage,
    SignalInput,
};
use crate::subspace::pseudospectrum::{count_degenerate, validate_dimensions};
use crate::subspace::{music_pseudospectrum_with, MusicOutput};
use crate::telemetry::log::LogManager;
use crate::telemetry::MetricsRecorder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// MUSIC parameters plus the evaluation grid in Hz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicStageConfig {
    pub music: MusicConfig,
    pub grid: FrequencyGridSpec,
}

#[derive(Debug, Clone)]
pub struct MusicStageOutput {
    pub grid_hz: Vec<f64>,
    pub music: MusicOutput,
}

/// Stage producing the coarse MUSIC pseudospectrum of a signal.
pub struct MusicStage<B = CpuBackend> {
    backend: B,
    config: Option<MusicStageConfig>,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl MusicStage<CpuBackend> {
    pub fn new(metrics: Arc<MetricsRecorder>) -> Self {
        Self::with_backend(CpuBackend, metrics)
    }
}

impl<B: LinalgBackend> MusicStage<B> {
    pub fn with_backend(backend: B, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            backend,
            config: None,
            logger: LogManager::new("music"),
            metrics,
        }
    }

    fn run(&self, input: &SignalInput) -> EstimationResult<MusicStageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| EstimationError::Internal("stage not initialized".into()))?;

        let grid_hz = config.grid.frequencies_hz()?;
        let grid = config.grid.normalized(input.sample_rate)?;
        let music = music_pseudospectrum_with(
            &self.backend,
            input.samples.view(),
            grid.view(),
            &config.music,
        )?;

        let degenerate = count_degenerate(&music.pseudospectrum);
        if degenerate > 0 {
            self.metrics.record_degenerate(degenerate);
        }
        self.logger.record(&format!(
            "rows {} p {:?} grid {} points, leading singular value {:.4e}",
            config.music.rows,
            config.music.dimensions.as_slice(),
            grid_hz.len(),
            music.decomposition.s.get(0).copied().unwrap_or(0.0)
        ));

        Ok(MusicStageOutput { grid_hz, music })
    }
}

impl<B: LinalgBackend> ProcessingStage for MusicStage<B> {
    type Config = MusicStageConfig;
    type Output = MusicStageOutput;

    fn initialize(&mut self, config: &MusicStageConfig) -> EstimationResult<()> {
        validate_dimensions(&config.music.dimensions, config.music.rows)?;
        config.grid.frequencies_hz()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: &SignalInput) -> EstimationResult<MusicStageOutput> {
        let result = self.run(input);
        match &result {
            Ok(_) => self.metrics.record_processed(),
            Err(err) => {
                self.metrics.record_error();
                self.logger.trace(&format!("execution failed: {}", err));
            }
        }
        result
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
