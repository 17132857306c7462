//! Receiver and emitter geometry for Doppler-shifted synthetic signals.

use anyhow::{ensure, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Sampled positions and velocities, one row per sample.
#[derive(Debug, Clone)]
pub struct Track {
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
}

impl Track {
    pub fn stationary(position: [f64; 3], samples: usize) -> Self {
        Self {
            positions: Array2::from_shape_fn((samples, 3), |(_, d)| position[d]),
            velocities: Array2::zeros((samples, 3)),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }
}

/// Horizontal circle of radius `radius` flown at `speed` and constant `height`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircularOrbit {
    pub radius: f64,
    pub speed: f64,
    pub height: f64,
    /// Angle of the first sample, in radians.
    #[serde(default)]
    pub phase: f64,
}

impl Default for CircularOrbit {
    fn default() -> Self {
        Self {
            radius: 100_000.0,
            speed: 100.0,
            height: 300.0,
            phase: 0.0,
        }
    }
}

impl CircularOrbit {
    /// Radians per second.
    pub fn angular_rate(&self) -> f64 {
        self.speed / self.radius
    }

    pub fn track(&self, samples: usize, sample_time: f64) -> Result<Track> {
        ensure!(self.radius > 0.0, "orbit radius must be positive");
        ensure!(sample_time > 0.0, "sample time must be positive");

        let rate = self.angular_rate();
        let mut positions = Array2::zeros((samples, 3));
        let mut velocities = Array2::zeros((samples, 3));
        for i in 0..samples {
            let (sin, cos) = (self.phase + rate * sample_time * i as f64).sin_cos();
            positions[[i, 0]] = self.radius * cos;
            positions[[i, 1]] = self.radius * sin;
            positions[[i, 2]] = self.height;
            velocities[[i, 0]] = -self.radius * sin * rate;
            velocities[[i, 1]] = self.radius * cos * rate;
        }
        Ok(Track {
            positions,
            velocities,
        })
    }
}

/// Shuttle between `start` and `end` at constant `speed`, turning back at each end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearPath {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub speed: f64,
}

impl LinearPath {
    pub fn track(&self, samples: usize, sample_time: f64) -> Result<Track> {
        ensure!(sample_time > 0.0, "sample time must be positive");
        let distances: Vec<f64> = (0..samples)
            .map(|i| self.speed * sample_time * i as f64)
            .collect();
        let positions = linear_trajectory(self.start, self.end, &distances)?;

        let (unit, length) = direction(self.start, self.end)?;
        let mut velocities = Array2::zeros((samples, 3));
        for (i, &distance) in distances.iter().enumerate() {
            let (_, backward) = leg(distance, length);
            let sign = if backward { -1.0 } else { 1.0 };
            for d in 0..3 {
                velocities[[i, d]] = sign * self.speed * unit[d];
            }
        }
        Ok(Track {
            positions,
            velocities,
        })
    }
}

/// Points `distances[i]` along `start -> end`, bouncing back and forth between the ends.
pub fn linear_trajectory(start: [f64; 3], end: [f64; 3], distances: &[f64]) -> Result<Array2<f64>> {
    let (unit, length) = direction(start, end)?;
    let mut positions = Array2::zeros((distances.len(), 3));
    for (i, &distance) in distances.iter().enumerate() {
        let (offset, _) = leg(distance, length);
        for d in 0..3 {
            positions[[i, d]] = start[d] + unit[d] * offset;
        }
    }
    Ok(positions)
}

fn direction(start: [f64; 3], end: [f64; 3]) -> Result<([f64; 3], f64)> {
    let delta = [end[0] - start[0], end[1] - start[1], end[2] - start[2]];
    let length = delta.iter().map(|v| v * v).sum::<f64>().sqrt();
    ensure!(length > 0.0, "path endpoints coincide");
    Ok(([delta[0] / length, delta[1] / length, delta[2] / length], length))
}

/// Offset from `start` after travelling `distance`, and whether that leg runs backwards.
fn leg(distance: f64, length: f64) -> (f64, bool) {
    let backward = (distance / length).floor().rem_euclid(2.0) == 1.0;
    let remainder = distance.rem_euclid(length);
    if backward {
        (length - remainder, true)
    } else {
        (remainder, false)
    }
}

/// Doppler frequency of arrival at the receiver for a carrier of `carrier_hz`.
///
/// Positive while the two close on each other.
pub fn frequency_of_arrival(receiver: &Track, emitter: &Track, carrier_hz: f64) -> Result<Array1<f64>> {
    ensure!(
        receiver.len() == emitter.len(),
        "receiver has {} samples, emitter {}",
        receiver.len(),
        emitter.len()
    );

    let mut foa = Array1::zeros(receiver.len());
    for i in 0..receiver.len() {
        let radial = &emitter.positions.row(i) - &receiver.positions.row(i);
        let range = radial.dot(&radial).sqrt();
        ensure!(range > 0.0, "emitter and receiver coincide at sample {}", i);
        let unit = radial / range;
        let closing = unit.dot(&receiver.velocities.row(i)) - unit.dot(&emitter.velocities.row(i));
        foa[i] = closing / SPEED_OF_LIGHT * carrier_hz;
    }
    Ok(foa)
}

/// `count` points on a triangular lattice with pitch `spacing`, starting at `origin`
/// and filling hexagonal rings anticlockwise from the +x axis.
pub fn triangular_lattice(count: usize, spacing: f64, origin: [f64; 2]) -> Result<Array2<f64>> {
    ensure!(count >= 2, "a lattice needs at least 2 points, got {}", count);
    ensure!(spacing > 0.0, "lattice spacing must be positive");

    let half = 3f64.sqrt() / 2.0;
    let directions = [
        [1.0, 0.0],
        [0.5, half],
        [-0.5, half],
        [-1.0, 0.0],
        [-0.5, -half],
        [0.5, -half],
    ];

    let mut points = Array2::zeros((count, 2));
    points[[0, 0]] = origin[0];
    points[[0, 1]] = origin[1];

    // Ring r holds 6r points; side s walks from r·d[s] towards r·d[s+1].
    let mut filled = 1;
    let mut ring = 1;
    'rings: loop {
        for (side, a) in directions.iter().enumerate() {
            let b = directions[(side + 1) % 6];
            for step in 0..ring {
                if filled == count {
                    break 'rings;
                }
                let (wa, wb) = ((ring - step) as f64, step as f64);
                points[[filled, 0]] = origin[0] + spacing * (wa * a[0] + wb * b[0]);
                points[[filled, 1]] = origin[1] + spacing * (wa * a[1] + wb * b[1]);
                filled += 1;
            }
        }
        ring += 1;
    }
    Ok(points)
}
