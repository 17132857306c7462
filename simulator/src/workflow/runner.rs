use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use spectracore::prelude::{ProcessingStage, SignalInput};
use spectracore::processing::{CztStage, MusicStage};
use spectracore::report::{CztTrace, PseudospectrumTrace, SpectrumReport};
use spectracore::telemetry::MetricsRecorder;
use std::sync::Arc;

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Runs the MUSIC and chirp-z stages on the same signal and collects a report.
    pub fn execute(&self, input: &SignalInput) -> anyhow::Result<SpectrumReport> {
        let metrics = Arc::new(MetricsRecorder::new());
        let mut music_stage = MusicStage::new(metrics.clone());
        let mut czt_stage = CztStage::new(metrics.clone());

        music_stage
            .initialize(&self.config.to_stage_config())
            .context("initializing MUSIC stage")?;
        czt_stage
            .initialize(&self.config.czt)
            .context("initializing CZT stage")?;

        let music = music_stage.execute(input).context("MUSIC stage failed")?;
        let czt = czt_stage.execute(input).context("CZT stage failed")?;
        music_stage.cleanup();
        czt_stage.cleanup();

        let hypotheses = self.config.music.dimensions.as_slice();
        let traces = hypotheses
            .iter()
            .enumerate()
            .filter_map(|(idx, &p)| {
                music.music.pseudospectrum.row(idx).map(|row| {
                    PseudospectrumTrace::from_row(p, &music.grid_hz, row, self.config.peak_count)
                })
            })
            .collect();

        info!(
            "workflow finished: {} samples, {} hypotheses, {} czt bins",
            input.samples.len(),
            hypotheses.len(),
            czt.spectrum.len()
        );

        Ok(SpectrumReport {
            sample_rate: input.sample_rate,
            samples: input.samples.len(),
            rows: self.config.music.rows,
            grid_hz: music.grid_hz,
            traces,
            singular_values: music.music.decomposition.summary(),
            czt: Some(CztTrace::from_spectrum(
                czt.band,
                czt.spectrum.view(),
                self.config.peak_count,
            )),
            metrics: metrics.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_signal, GeneratorConfig, ToneSpec};
    use spectracore::prelude::{CztBand, FrequencyGridSpec};

    fn small_workflow() -> WorkflowConfig {
        let mut cfg = WorkflowConfig::from_args(40, vec![1, 2], Some(1), true, false);
        cfg.generator = GeneratorConfig {
            sample_rate: 1000.0,
            length: 400,
            tones: vec![
                ToneSpec {
                    frequency: 100.0,
                    amplitude: 1.0,
                    phase: 0.0,
                },
                ToneSpec {
                    frequency: 140.0,
                    amplitude: 1.0,
                    phase: 0.4,
                },
            ],
            noise: 0.01,
            seed: 7,
            motion: None,
        };
        cfg.grid = FrequencyGridSpec {
            start_hz: 80.0,
            stop_hz: 160.0,
            step_hz: 0.25,
        };
        cfg.czt = CztBand::new(80.0, 160.0, 0.5);
        cfg
    }

    #[test]
    fn runner_reports_both_spectra() {
        let cfg = small_workflow();
        let signal = build_signal(&cfg.generator).unwrap();
        let report = Runner::new(cfg).execute(&signal).unwrap();

        assert_eq!(report.traces.len(), 2);
        assert_eq!(report.grid_hz.len(), 321);
        assert_eq!(report.metrics.processed, 2);
        assert_eq!(report.singular_values.dimension, 40);

        let peaks: Vec<f64> = report.traces[1]
            .peaks
            .iter()
            .map(|p| p.frequency_hz)
            .collect();
        assert_eq!(peaks.len(), 2);
        assert!((peaks[0] - 100.0).abs() <= 0.5);
        assert!((peaks[1] - 140.0).abs() <= 0.5);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["rows"], 40);
        assert_eq!(json["traces"][0]["p"], 1);

        let czt = report.czt.unwrap();
        assert_eq!(czt.magnitudes.len(), 161);
    }

    #[test]
    fn runner_surfaces_stage_errors() {
        let mut cfg = small_workflow();
        cfg.music.rows = 1000;
        let signal = build_signal(&cfg.generator).unwrap();
        assert!(Runner::new(cfg).execute(&signal).is_err());
    }
}
