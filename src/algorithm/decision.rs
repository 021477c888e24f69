//! Three-pass stochastic decision of which cells refresh this frame
//!
//! Pass 1 rolls every cell against its probability. Pass 2 lets every cell
//! push on its Chebyshev neighborhood: updating cells raise their neighbors'
//! odds, idle cells lower them slightly. Pass 3 re-tests idle cells against
//! the neighbor-adjusted probability using the same cached draw, so each cell
//! carries a single random threshold through the whole frame.

use ndarray::{Array2, Zip};

use crate::io::configuration::{MAX_BRIGHTNESS, MosaicSettings, REROLL_GAIN};
use crate::math::color::gray;
use crate::math::probability::{clamp_unit, normalized_probability};
use crate::spatial::grid::{CellGrid, neighbor_count, region_spans};
use crate::spatial::palette::TilePalette;

/// Final decisions of a frame together with the neighbor adjustments
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDecision {
    /// Cells that refresh this frame
    pub should_update: Array2<bool>,
    /// Cells selected by the independent roll alone
    pub initial_updates: usize,
    /// Accumulated neighbor influence per cell
    pub adjustment: Array2<f64>,
}

impl UpdateDecision {
    /// Number of refreshing cells
    pub fn update_count(&self) -> usize {
        self.should_update.iter().filter(|&&update| update).count()
    }
}

/// Pass 1: independent roll `r < p` per cell
pub fn initial_roll(draws: &Array2<f64>, probabilities: &Array2<f64>) -> Array2<bool> {
    Zip::from(draws)
        .and(probabilities)
        .map_collect(|&draw, &probability| draw < probability)
}

/// Pass 2: spread influence from every cell onto its neighbors
///
/// Updating cells add `increment` to each neighbor within `radius`, idle cells
/// subtract `increment / neighbor_count`. The center cell is excluded and the
/// neighborhood is clipped at the grid edges.
pub fn accumulate_neighbor_influence(
    decisions: &Array2<bool>,
    radius: usize,
    increment: f64,
) -> Array2<f64> {
    let dim = decisions.dim();
    let mut adjustment = Array2::zeros(dim);
    let penalty = -increment / neighbor_count(radius) as f64;

    for ((x, y), &updating) in decisions.indexed_iter() {
        let value = if updating { increment } else { penalty };
        let (cols, rows) = region_spans([x, y], radius, dim);

        for nx in cols {
            for ny in rows.clone() {
                if nx == x && ny == y {
                    continue;
                }
                if let Some(cell) = adjustment.get_mut([nx, ny]) {
                    *cell += value;
                }
            }
        }
    }

    adjustment
}

/// Pass 3: re-test idle cells against the neighbor-adjusted probability
///
/// The draw is the one cached for pass 1, not a fresh one.
pub fn reroll(
    decisions: &mut Array2<bool>,
    adjustment: &Array2<f64>,
    probabilities: &Array2<f64>,
    draws: &Array2<f64>,
) {
    Zip::from(decisions)
        .and(adjustment)
        .and(probabilities)
        .and(draws)
        .for_each(|decision, &adjust, &probability, &draw| {
            if !*decision {
                let adjusted = clamp_unit((adjust + probability) * REROLL_GAIN);
                *decision = draw < adjusted;
            }
        });
}

/// Run all three passes
///
/// Deterministic for fixed draws and probabilities.
pub fn decide_updates(
    draws: &Array2<f64>,
    probabilities: &Array2<f64>,
    radius: usize,
    increment: f64,
) -> UpdateDecision {
    let mut should_update = initial_roll(draws, probabilities);
    let initial_updates = should_update.iter().filter(|&&update| update).count();
    let adjustment = accumulate_neighbor_influence(&should_update, radius, increment);
    reroll(&mut should_update, &adjustment, probabilities, draws);

    UpdateDecision {
        should_update,
        initial_updates,
        adjustment,
    }
}

/// Paint the probability field as grayscale instead of running the pipeline
///
/// Every cell gets the gray level of its normalized probability, the palette
/// tile of matching brightness and a redraw flag.
pub fn visualize_probabilities(
    grid: &mut CellGrid,
    probabilities: &Array2<f64>,
    palette: &TilePalette,
    settings: &MosaicSettings,
) {
    for cell in grid.iter_mut() {
        let [x, y] = cell.position;
        let probability = probabilities.get([x, y]).copied().unwrap_or(0.0);
        let level = MAX_BRIGHTNESS
            * normalized_probability(
                probability,
                settings.min_update_probability,
                settings.max_update_probability,
            );

        cell.tile = Some(palette.nearest(level));
        cell.color = gray(level);
        cell.dirty = true;
    }
}
