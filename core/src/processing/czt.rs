use crate::prelude::{CztBand, EstimationError, EstimationResult, ProcessingStage, SignalInput};
use crate::telemetry::log::LogManager;
use crate::telemetry::MetricsRecorder;
use crate::transform::czt::chirp_z_band;
use ndarray::Array1;
use num_complex::Complex64;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CztStageOutput {
    pub band: CztBand,
    pub spectrum: Array1<Complex64>,
}

/// Stage producing the fine-resolution reference spectrum over a narrow band.
pub struct CztStage {
    band: Option<CztBand>,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl CztStage {
    pub fn new(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            band: None,
            logger: LogManager::new("czt"),
            metrics,
        }
    }

    fn run(&self, input: &SignalInput) -> EstimationResult<CztStageOutput> {
        let band = self
            .band
            .ok_or_else(|| EstimationError::Internal("stage not initialized".into()))?;
        let spectrum = chirp_z_band(input.samples.view(), &band, input.sample_rate)?;

        let (peak_idx, peak) = spectrum
            .iter()
            .map(|v| v.norm())
            .enumerate()
            .fold((0, 0.0), |best, (idx, mag)| if mag > best.1 { (idx, mag) } else { best });
        self.logger.record(&format!(
            "{} bins over {:.3}-{:.3} Hz, peak {:.4e} at {:.3} Hz",
            spectrum.len(),
            band.f1,
            band.f2,
            peak,
            band.f1 + peak_idx as f64 * band.bin_width
        ));

        Ok(CztStageOutput { band, spectrum })
    }
}

impl ProcessingStage for CztStage {
    type Config = CztBand;
    type Output = CztStageOutput;

    fn initialize(&mut self, config: &CztBand) -> EstimationResult<()> {
        if !(config.bin_width > 0.0) || !(config.f2 > config.f1) {
            return Err(EstimationError::InvalidParameter(format!(
                "invalid band {:?}",
                config
            )));
        }
        self.band = Some(*config);
        Ok(())
    }

    fn execute(&mut self, input: &SignalInput) -> EstimationResult<CztStageOutput> {
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
        self.band = None;
    }
}
