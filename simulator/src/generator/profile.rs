use crate::generator::template::{complex_tone, swept_tone};
use crate::generator::trajectory::{
    frequency_of_arrival, triangular_lattice, CircularOrbit, LinearPath, Track,
};
use anyhow::{ensure, Context};
use ndarray::Array1;
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use spectracore::SignalInput;

/// One complex exponential in the synthetic signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneSpec {
    pub frequency: f64,
    #[serde(default = "unit_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub phase: f64,
}

fn unit_amplitude() -> f64 {
    1.0
}

/// Emitter observed by the moving receiver. Stationary at `position` unless `path` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterSpec {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub path: Option<LinearPath>,
    /// Baseband offset added to the Doppler shift.
    #[serde(default)]
    pub offset_hz: f64,
    #[serde(default = "unit_amplitude")]
    pub amplitude: f64,
}

/// Stationary emitters on a triangular lattice at a common height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeSpec {
    pub count: usize,
    pub spacing: f64,
    #[serde(default)]
    pub origin: [f64; 2],
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub offset_hz: f64,
    #[serde(default = "unit_amplitude")]
    pub amplitude: f64,
}

/// Receiver on a circular orbit listening to Doppler-shifted emitters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "default_carrier")]
    pub carrier_hz: f64,
    #[serde(default)]
    pub receiver: CircularOrbit,
    #[serde(default)]
    pub emitters: Vec<EmitterSpec>,
    #[serde(default)]
    pub lattice: Option<LatticeSpec>,
}

fn default_carrier() -> f64 {
    30e6
}

/// Instantaneous frequency of one emitter as seen by the receiver.
#[derive(Debug, Clone)]
pub struct DopplerTone {
    pub amplitude: f64,
    pub frequencies: Array1<f64>,
}

impl MotionConfig {
    /// Per-sample received frequency of every emitter over `samples` samples.
    pub fn doppler_tones(&self, samples: usize, sample_rate: f64) -> anyhow::Result<Vec<DopplerTone>> {
        let sample_time = 1.0 / sample_rate;
        let receiver = self
            .receiver
            .track(samples, sample_time)
            .context("building receiver orbit")?;

        let mut sources: Vec<(Track, f64, f64)> = Vec::new();
        for emitter in &self.emitters {
            let track = match &emitter.path {
                Some(path) => path
                    .track(samples, sample_time)
                    .context("building emitter path")?,
                None => Track::stationary(emitter.position, samples),
            };
            sources.push((track, emitter.offset_hz, emitter.amplitude));
        }
        if let Some(lattice) = &self.lattice {
            let points = triangular_lattice(lattice.count, lattice.spacing, lattice.origin)
                .context("placing lattice emitters")?;
            for point in points.rows() {
                let position = [point[0], point[1], lattice.height];
                sources.push((
                    Track::stationary(position, samples),
                    lattice.offset_hz,
                    lattice.amplitude,
                ));
            }
        }

        sources
            .into_iter()
            .map(|(track, offset_hz, amplitude)| {
                let foa = frequency_of_arrival(&receiver, &track, self.carrier_hz)?;
                Ok::<_, anyhow::Error>(DopplerTone {
                    amplitude,
                    frequencies: foa + offset_hz,
                })
            })
            .collect()
    }
}

/// Configuration for generating a synthetic multi-tone signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate: f64,
    pub length: usize,
    pub tones: Vec<ToneSpec>,
    /// Half-width of the uniform jitter added to each of I and Q.
    pub noise: f64,
    pub seed: u64,
    /// Extra tones whose frequencies follow receiver and emitter motion.
    pub motion: Option<MotionConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 10_000.0,
            length: 10_000,
            tones: vec![
                ToneSpec {
                    frequency: 1000.0,
                    amplitude: 1.0,
                    phase: 0.0,
                },
                ToneSpec {
                    frequency: 1000.5,
                    amplitude: 1.0,
                    phase: 0.0,
                },
            ],
            noise: 0.3,
            seed: 0,
            motion: None,
        }
    }
}

fn build_sample_vector(config: &GeneratorConfig) -> anyhow::Result<Array1<Complex64>> {
    ensure!(config.length > 0, "generator length must be positive");
    ensure!(
        config.sample_rate > 0.0,
        "generator sample rate must be positive, got {}",
        config.sample_rate
    );
    ensure!(config.noise >= 0.0, "generator noise must be non-negative");

    let mut samples = Array1::<Complex64>::zeros(config.length);
    for tone in &config.tones {
        samples += &complex_tone(
            config.length,
            tone.frequency,
            config.sample_rate,
            tone.amplitude,
            tone.phase,
        );
    }

    if let Some(motion) = &config.motion {
        for tone in motion.doppler_tones(config.length, config.sample_rate)? {
            samples += &swept_tone(
                tone.frequencies.view(),
                config.sample_rate,
                tone.amplitude,
                0.0,
            );
        }
    }

    if config.noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(config.seed);
        for sample in samples.iter_mut() {
            *sample += Complex64::new(
                rng.gen_range(-config.noise..config.noise),
                rng.gen_range(-config.noise..config.noise),
            );
        }
    }

    Ok(samples)
}

pub fn build_signal(config: &GeneratorConfig) -> anyhow::Result<SignalInput> {
    let samples = build_sample_vector(config).context("building synthetic signal")?;
    Ok(SignalInput::new(samples, config.sample_rate))
}
