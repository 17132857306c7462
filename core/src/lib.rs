//! Subspace and chirp-z spectral estimation.
//!
//! The MUSIC pipeline (snapshot matrix, sample covariance, SVD, pseudospectrum) gives a
//! coarse, high-resolution view of the tones in a signal; the chirp-z transform gives an
//! exact fine-grained spectrum over a narrow band to compare it against.

pub mod batch;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod report;
pub mod subspace;
pub mod telemetry;
pub mod transform;

pub use prelude::{
    CztBand, Dimensions, EstimationError, EstimationResult, MusicConfig, ProcessingStage,
    SignalInput,
};
pub use subspace::{music_pseudospectrum, MusicOutput, Pseudospectrum, SubspaceDecomposition};
pub use transform::chirp_z_transform;
