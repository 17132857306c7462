//! Parallel evaluation of independent estimation requests over one signal.
//!
//! Every entry point returns exactly what the corresponding sequential call would; the
//! work is only spread across the rayon pool.

use crate::math::matrix::CpuBackend;
use crate::prelude::{CztBand, EstimationResult, MusicConfig};
use crate::subspace::pseudospectrum::{assemble, hypothesis_spectrum, steering_projection};
use crate::subspace::{music_pseudospectrum, MusicOutput, Pseudospectrum, SubspaceDecomposition};
use crate::transform::czt::chirp_z_band;
use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use rayon::prelude::*;

/// Runs one MUSIC pipeline per configuration, in parallel. Results keep input order.
pub fn music_batch(
    signal: ArrayView1<Complex64>,
    grid: ArrayView1<f64>,
    configs: &[MusicConfig],
) -> Vec<EstimationResult<MusicOutput>> {
    configs
        .par_iter()
        .map(|config| music_pseudospectrum(signal, grid, config))
        .collect()
}

/// Evaluates the hypotheses in `config` in parallel on a decomposition computed once.
pub fn music_hypotheses_parallel(
    grid: ArrayView1<f64>,
    config: &MusicConfig,
    decomposition: &SubspaceDecomposition,
) -> EstimationResult<Pseudospectrum> {
    let projection = steering_projection(
        &CpuBackend,
        grid,
        config.rows,
        &config.dimensions,
        decomposition,
    )?;
    let spectra = config
        .dimensions
        .as_slice()
        .par_iter()
        .map(|&p| {
            hypothesis_spectrum(
                projection.view(),
                &decomposition.s,
                p,
                config.signal_numerator,
            )
        })
        .collect::<EstimationResult<Vec<_>>>()?;
    Ok(assemble(&config.dimensions, grid.len(), spectra))
}

/// Chirp-z spectra of several bands of the same signal, in parallel.
pub fn czt_bands(
    signal: ArrayView1<Complex64>,
    bands: &[CztBand],
    fs: f64,
) -> Vec<EstimationResult<Array1<Complex64>>> {
    bands
        .par_iter()
        .map(|band| chirp_z_band(signal, band, fs))
        .collect()
}
