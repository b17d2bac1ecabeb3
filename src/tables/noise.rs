//! Seeded noise table read by the fractal noise generator.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const NOISE_TABLE_SIZE: usize = 4096;
const NOISE_TABLE_MASK: usize = NOISE_TABLE_SIZE - 1;

/// Peak table value. Fractal sums are normalized by `1/sqrt(sum of weights)`
/// with the weights summing below 2, so output stays under `NOISE_PEAK * sqrt(2)` = 1.2.
pub const NOISE_PEAK: f32 = 0.8485;

pub const DEFAULT_NOISE_SEED: u64 = 69420;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interpolation {
    Nearest,
    Linear,
    #[default]
    Cubic,
}

impl Interpolation {
    pub const COUNT: usize = 3;

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Interpolation::Nearest,
            1 => Interpolation::Linear,
            _ => Interpolation::Cubic,
        }
    }
}

/// Circular table of uniform noise in `[-NOISE_PEAK, NOISE_PEAK]`.
/// Clones share the same samples.
#[derive(Debug, Clone)]
pub struct NoiseTable {
    values: Arc<[f32]>,
    seed: u64,
}

impl NoiseTable {
    /// Allocates. Build tables outside the audio callback.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values: Vec<f32> = (0..NOISE_TABLE_SIZE)
            .map(|_| rng.random_range(-NOISE_PEAK..=NOISE_PEAK))
            .collect();
        Self {
            values: values.into(),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    fn at(&self, index: i64) -> f32 {
        self.values[(index as usize) & NOISE_TABLE_MASK]
    }

    /// Reads the table at a position measured in cells. Positions wrap.
    #[inline]
    pub fn sample(&self, position: f64, interpolation: Interpolation) -> f32 {
        let base = position.floor();
        let frac = (position - base) as f32;
        let i = base as i64;

        match interpolation {
            Interpolation::Nearest => {
                if frac < 0.5 {
                    self.at(i)
                } else {
                    self.at(i + 1)
                }
            }
            Interpolation::Linear => {
                let a = self.at(i);
                let b = self.at(i + 1);
                a + (b - a) * frac
            }
            Interpolation::Cubic => {
                monotone_hermite(self.at(i - 1), self.at(i), self.at(i + 1), self.at(i + 2), frac)
            }
        }
    }
}

impl Default for NoiseTable {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

/// Harmonic-mean tangent; zero at local extrema.
#[inline]
fn limited_tangent(d0: f32, d1: f32) -> f32 {
    if d0 * d1 <= 0.0 {
        0.0
    } else {
        2.0 * d0 * d1 / (d0 + d1)
    }
}

/// Cubic Hermite segment between `p1` and `p2` that never leaves `[min(p1,p2), max(p1,p2)]`.
#[inline]
pub fn monotone_hermite(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let d0 = p1 - p0;
    let d1 = p2 - p1;
    let d2 = p3 - p2;
    let m1 = limited_tangent(d0, d1);
    let m2 = limited_tangent(d1, d2);

    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p1 + h10 * m1 + h01 * p2 + h11 * m2
}
