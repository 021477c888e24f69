//! Grid cell store holding the per-cell rendering state
//!
//! One [`GridCell`] per grid coordinate lives for the whole session after grid
//! sizing. The store is an engine-owned `Array2` indexed by `[column, row]`
//! and is passed by reference through every pipeline stage.

use image::Rgb;
use ndarray::Array2;
use std::ops::Range;

use crate::spatial::palette::TileId;

/// Mutable state of one grid position
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Grid coordinates (column, row), fixed at creation
    pub position: [usize; 2],
    /// Temporary sampling offset (dx, dy), decays toward zero every frame
    pub displacement: [f64; 2],
    /// Weight of the previous source image in the resolved color
    pub last_image_influence: f64,
    /// Palette entry currently drawn in this cell
    pub tile: Option<TileId>,
    /// Last composited tint color
    pub color: Rgb<u8>,
    /// Visual state changed and must be redrawn
    pub dirty: bool,
    /// Uniform draw in `[0, 1)` shared by every decision of the current frame
    pub frame_random: f64,
}

impl GridCell {
    /// Create a blank cell at the given (column, row)
    pub const fn new(position: [usize; 2]) -> Self {
        Self {
            position,
            displacement: [0.0, 0.0],
            last_image_influence: 0.0,
            tile: None,
            color: Rgb([0, 0, 0]),
            dirty: false,
            frame_random: 0.0,
        }
    }

    /// Check whether any displacement is pending
    pub fn is_displaced(&self) -> bool {
        self.displacement != [0.0, 0.0]
    }
}

/// All cells of the mosaic, indexed by `[column, row]`
#[derive(Debug, Clone)]
pub struct CellGrid {
    cells: Array2<GridCell>,
}

impl CellGrid {
    /// Create a grid of blank cells
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: Array2::from_shape_fn((cols, rows), |(x, y)| GridCell::new([x, y])),
        }
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cells.dim().0
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.cells.dim().1
    }

    /// Grid dimensions as (columns, rows)
    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Cell at (column, row), if inside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<&GridCell> {
        self.cells.get([x, y])
    }

    /// Mutable cell at (column, row), if inside the grid
    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut GridCell> {
        self.cells.get_mut([x, y])
    }

    /// Iterate over every cell
    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Iterate mutably over every cell
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GridCell> {
        self.cells.iter_mut()
    }

    /// Iterate mutably over the cells flagged for redraw
    pub fn dirty_cells_mut(&mut self) -> impl Iterator<Item = &mut GridCell> {
        self.cells.iter_mut().filter(|cell| cell.dirty)
    }

    /// Number of cells flagged for redraw
    pub fn dirty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.dirty).count()
    }

    /// Per-cell frame draws as a standalone array
    pub fn frame_randoms(&self) -> Array2<f64> {
        self.cells.map(|cell| cell.frame_random)
    }

    /// Positions inside a filled circle around `center`
    ///
    /// Scans the part of the square bounding box that lies on the grid and
    /// keeps positions with `dx² + dy² <= radius²`. The center may lie outside
    /// the grid; positions outside the grid are never returned. The scan never
    /// exceeds the grid, whatever the radius.
    pub fn cells_within_circle(&self, center: [i64; 2], radius: i64) -> Vec<[usize; 2]> {
        if radius < 0 {
            return Vec::new();
        }

        let (cols, rows) = self.dim();
        let span = |center: i64, len: usize| {
            let low = center.saturating_sub(radius).max(0);
            let high = center
                .saturating_add(radius)
                .min(i64::try_from(len).unwrap_or(i64::MAX) - 1);
            low..=high
        };
        let squared = |delta: i128| delta.unsigned_abs().pow(2);
        let limit = squared(i128::from(radius));

        let mut positions = Vec::new();
        for x in span(center[0], cols) {
            let dx = squared(i128::from(x) - i128::from(center[0]));
            for y in span(center[1], rows) {
                let dy = squared(i128::from(y) - i128::from(center[1]));
                if dx + dy <= limit {
                    positions.push([x as usize, y as usize]);
                }
            }
        }

        positions
    }
}

/// Cells in a square neighborhood of the given radius, excluding the center
///
/// Saturates at `usize::MAX` for radii whose neighborhood does not fit.
pub const fn neighbor_count(radius: usize) -> usize {
    let side = radius.saturating_mul(2).saturating_add(1);
    side.saturating_mul(side).saturating_sub(1)
}

/// Get region spans for a position and radius, clipped to `dim`
///
/// Returns half-open column and row ranges that never leave the grid.
pub fn region_spans(
    position: [usize; 2],
    radius: usize,
    dim: (usize, usize),
) -> (Range<usize>, Range<usize>) {
    let col_start = position[0].saturating_sub(radius);
    let row_start = position[1].saturating_sub(radius);
    let col_end = position[0].saturating_add(radius + 1).min(dim.0);
    let row_end = position[1].saturating_add(radius + 1).min(dim.1);

    (col_start..col_end.max(col_start), row_start..row_end.max(row_start))
}

/// Step each displacement axis one unit toward zero
///
/// Axes within one unit of zero snap to zero, so the displacement never
/// overshoots and reaches (0, 0) within `ceil(|d|)` steps.
pub fn decay_displacement(displacement: &mut [f64; 2]) {
    for axis in displacement.iter_mut() {
        *axis = if axis.abs() <= 1.0 {
            0.0
        } else {
            *axis - axis.signum()
        };
    }
}
