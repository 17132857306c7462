pub mod fft;
pub mod matrix;
pub mod stats;

pub use fft::FftHelper;
pub use matrix::{CpuBackend, LinalgBackend};
pub use stats::StatsHelper;
