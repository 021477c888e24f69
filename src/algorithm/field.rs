//! Per-frame update probability field built from coherent noise

use ndarray::Array2;

use crate::io::configuration::MosaicSettings;
use crate::math::noise::NoiseField;
use crate::math::probability::update_probability;

/// Update probability of every cell at time `time` (seconds)
///
/// Each value lies within the configured probability range. The field is
/// indexed by `[column, row]` like the cell store and lives for one frame.
pub fn build_probability_field<N: NoiseField + ?Sized>(
    noise: &N,
    dim: (usize, usize),
    time: f64,
    settings: &MosaicSettings,
) -> Array2<f64> {
    let t = time * settings.noise_time_scale;
    Array2::from_shape_fn(dim, |(x, y)| {
        let raw = noise.sample(
            x as f64 * settings.noise_scale,
            y as f64 * settings.noise_scale,
            t,
        );
        update_probability(
            raw,
            settings.min_update_probability,
            settings.max_update_probability,
        )
    })
}
