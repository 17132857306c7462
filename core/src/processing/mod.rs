pub mod czt;
pub mod music;

pub use czt::{CztStage, CztStageOutput};
pub use music::{MusicStage, MusicStageConfig, MusicStageOutput};
