//! Pixel resolution and color blending for refreshing cells

use image::Rgb;
use ndarray::Array2;
use rand::Rng;

use crate::io::configuration::{
    BORDER_GRAY_MAX, BORDER_GRAY_WEIGHT, BRIGHTNESS_JITTER, BRIGHTNESS_JITTER_CHANCE,
    COMMIT_THRESHOLD, MAX_BRIGHTNESS, MosaicSettings, STRONG_COMMIT_WEIGHT, WEAK_COMMIT_WEIGHT,
};
use crate::math::color::{blend, brightness, gray};
use crate::math::probability::normalized_probability;
use crate::spatial::grid::{CellGrid, GridCell};
use crate::spatial::palette::TilePalette;
use crate::spatial::source::{Sample, ScaledSource, SourcePair};

/// Source image coordinate sampled by a cell
///
/// Grid position minus the letterbox offset plus the truncated displacement.
pub fn source_coordinate(position: [usize; 2], offset: [i64; 2], displacement: [f64; 2]) -> [i64; 2] {
    [
        position[0] as i64 - offset[0] + displacement[0].trunc() as i64,
        position[1] as i64 - offset[1] + displacement[1].trunc() as i64,
    ]
}

/// Sample a source image, softening out-of-image samples with a gray tone
///
/// Outside the image the nearest edge pixel is blended half and half with a
/// gray whose level follows the update probability at that edge pixel's grid
/// position, remapped onto `[0, 60]`.
pub fn sample_with_border(
    source: &ScaledSource,
    coordinate: [i64; 2],
    offset: [i64; 2],
    probabilities: &Array2<f64>,
    settings: &MosaicSettings,
) -> Rgb<u8> {
    match source.sample(coordinate[0], coordinate[1]) {
        Sample::Inside(color) => color,
        Sample::Border { color, pixel } => {
            let grid_x = i64::from(pixel[0]) + offset[0];
            let grid_y = i64::from(pixel[1]) + offset[1];
            let probability = usize::try_from(grid_x)
                .ok()
                .zip(usize::try_from(grid_y).ok())
                .and_then(|(x, y)| probabilities.get([x, y]).copied())
                .unwrap_or(settings.min_update_probability);

            let level = normalized_probability(
                probability,
                settings.min_update_probability,
                settings.max_update_probability,
            ) * BORDER_GRAY_MAX;

            blend(color, gray(level), BORDER_GRAY_WEIGHT)
        }
    }
}

/// Target brightness with an occasional random offset
///
/// One call in ten shifts the brightness by up to ±20, clamped to `[0, 255]`.
pub fn modulate_brightness<R: Rng + ?Sized>(value: f64, rng: &mut R) -> f64 {
    if rng.random::<f64>() > BRIGHTNESS_JITTER_CHANCE {
        return value;
    }
    let offset = rng.random_range(-BRIGHTNESS_JITTER..BRIGHTNESS_JITTER);
    (value + offset).clamp(0.0, MAX_BRIGHTNESS)
}

/// Reduce a positive last-image influence by the high or low amount
///
/// A fresh draw above the reduction chance picks the high amount. The result
/// never drops below zero.
pub fn decay_influence<R: Rng + ?Sized>(
    influence: f64,
    settings: &MosaicSettings,
    rng: &mut R,
) -> f64 {
    let reduction = if rng.random::<f64>() > settings.influence_reduction_chance {
        settings.influence_reduction_high
    } else {
        settings.influence_reduction_low
    };
    (influence - reduction).max(0.0)
}

/// Blend weight of the resolved color for a cell's frame draw
pub fn commit_weight(frame_random: f64) -> f64 {
    if frame_random > COMMIT_THRESHOLD {
        STRONG_COMMIT_WEIGHT
    } else {
        WEAK_COMMIT_WEIGHT
    }
}

/// Resolve one refreshing cell: sample, pick a tile and blend its color
pub fn resolve_cell<R: Rng + ?Sized>(
    cell: &mut GridCell,
    sources: &SourcePair,
    probabilities: &Array2<f64>,
    palette: &TilePalette,
    settings: &MosaicSettings,
    rng: &mut R,
) {
    let offset = sources.current().offset();
    let coordinate = source_coordinate(cell.position, offset, cell.displacement);
    let current = sample_with_border(sources.current(), coordinate, offset, probabilities, settings);

    let resolved = if cell.last_image_influence > 0.0 {
        let previous =
            sample_with_border(sources.previous(), coordinate, offset, probabilities, settings);
        let mixed = blend(current, previous, cell.last_image_influence);
        cell.last_image_influence = decay_influence(cell.last_image_influence, settings, rng);
        mixed
    } else {
        current
    };

    let target = modulate_brightness(brightness(resolved), rng);
    cell.tile = Some(palette.nearest(target));
    cell.color = blend(cell.color, resolved, commit_weight(cell.frame_random));
    cell.dirty = true;
}

/// Resolve every cell selected for refresh and return how many were resolved
///
/// Cells not selected are left untouched.
pub fn resolve_updates<R: Rng + ?Sized>(
    grid: &mut CellGrid,
    should_update: &Array2<bool>,
    sources: &SourcePair,
    probabilities: &Array2<f64>,
    palette: &TilePalette,
    settings: &MosaicSettings,
    rng: &mut R,
) -> usize {
    let mut resolved = 0;

    for cell in grid.iter_mut() {
        let [x, y] = cell.position;
        if should_update.get([x, y]).copied().unwrap_or(false) {
            resolve_cell(cell, sources, probabilities, palette, settings, rng);
            resolved += 1;
        }
    }

    resolved
}
