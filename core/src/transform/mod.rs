//! Spectrum evaluation at arbitrary frequencies.

pub mod czt;
pub mod dft;

pub use czt::{chirp_z_band, chirp_z_transform};
pub use dft::{dft, tone_spectrum};
