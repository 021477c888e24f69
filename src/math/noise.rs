//! Coherent noise sampling over space and time

use ::noise::{NoiseFn, Perlin};

/// A deterministic 3D noise source producing values in `[0, 1]`
///
/// Sampled with grid coordinates scaled by the noise scale and with time
/// scaled by the noise time scale. Same inputs must give the same output.
pub trait NoiseField: Send + Sync {
    /// Sample the field at `(x, y)` and time `t`
    fn sample(&self, x: f64, y: f64, t: f64) -> f64;
}

/// Perlin noise remapped from `[-1, 1]` onto `[0, 1]`
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    noise: Perlin,
}

impl PerlinNoise {
    /// Create a seeded Perlin field
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
        }
    }
}

impl NoiseField for PerlinNoise {
    fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        let raw = self.noise.get([x, y, t]);
        raw.mul_add(0.5, 0.5).clamp(0.0, 1.0)
    }
}

/// Noise field returning the same value everywhere
///
/// Handy for reproducing a fixed update probability across the whole grid.
#[derive(Clone, Copy, Debug)]
pub struct ConstantNoise(pub f64);

impl NoiseField for ConstantNoise {
    fn sample(&self, _x: f64, _y: f64, _t: f64) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}
