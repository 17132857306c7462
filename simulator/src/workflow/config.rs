use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use spectracore::prelude::{CztBand, Dimensions, FrequencyGridSpec, MusicConfig};
use spectracore::processing::MusicStageConfig;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub music: MusicConfig,
    pub grid: FrequencyGridSpec,
    pub czt: CztBand,
    #[serde(default = "default_peak_count")]
    pub peak_count: usize,
}

fn default_peak_count() -> usize {
    2
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::from_args(1000, vec![1, 2, 3, 4], Some(1), false, false)
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Two tones half a hertz apart around 1 kHz, the grid and band centred on them.
    pub fn from_args(
        rows: usize,
        dimensions: Vec<usize>,
        snapshot_jump: Option<usize>,
        forward_backward: bool,
        signal_numerator: bool,
    ) -> Self {
        let dimensions = match dimensions.as_slice() {
            [p] => Dimensions::One(*p),
            _ => Dimensions::Many(dimensions),
        };
        Self {
            generator: GeneratorConfig::default(),
            music: MusicConfig {
                rows,
                dimensions,
                snapshot_jump,
                forward_backward,
                signal_numerator,
            },
            grid: FrequencyGridSpec {
                start_hz: 999.5,
                stop_hz: 1001.0,
                step_hz: 0.01,
            },
            czt: CztBand::new(997.25, 1003.25, 0.01),
            peak_count: default_peak_count(),
        }
    }

    pub fn to_stage_config(&self) -> MusicStageConfig {
        MusicStageConfig {
            music: self.music.clone(),
            grid: self.grid,
        }
    }
}
