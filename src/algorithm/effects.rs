//! Pointer hover effects, global displacement and displacement decay

use image::Rgb;

use crate::algorithm::resolve::source_coordinate;
use crate::io::configuration::{
    COMMIT_THRESHOLD, DIRECTIONAL_FALLOFF_GAIN, GLOBAL_ACCUMULATE_GAIN, GLOBAL_NOISE_OFFSET_X,
    GLOBAL_NOISE_OFFSET_Y, GLOBAL_SET_GAIN, HOVER_TRAVEL_RANGE, MosaicSettings,
    POINTER_TRAVEL_MARGIN,
};
use crate::math::noise::NoiseField;
use crate::math::probability::map_range;
use crate::spatial::grid::{CellGrid, decay_displacement};
use crate::spatial::source::{Sample, SourcePair};

const OUTSIDE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Pointer effect variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HoverEffect {
    /// No pointer effect
    #[default]
    None,
    /// Flash the previous image under the pointer and arm last-image blending
    Ghost,
    /// Replace the displacement of hovered cells with a movement-based vector
    DisplaceSet,
    /// Add a movement-based vector to the displacement of hovered cells
    DisplaceAccumulate,
    /// Ghost together with `DisplaceSet`
    Both,
}

impl HoverEffect {
    /// Whether the ghost blend runs
    pub const fn ghost(self) -> bool {
        matches!(self, Self::Ghost | Self::Both)
    }

    /// Whether the directional displacement runs
    pub const fn displaces(self) -> bool {
        matches!(
            self,
            Self::DisplaceSet | Self::DisplaceAccumulate | Self::Both
        )
    }

    /// Whether the directional displacement adds instead of replacing
    pub const fn accumulates(self) -> bool {
        matches!(self, Self::DisplaceAccumulate)
    }
}

/// Noise-driven displacement applied to every cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GlobalDisplacement {
    /// Disabled
    #[default]
    Off,
    /// Replace each cell's displacement every frame
    Set,
    /// Add a small vector to each cell's displacement every frame
    Accumulate,
}

/// Pointer position this frame and last frame, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position this frame
    pub position: [f64; 2],
    /// Position last frame
    pub previous: [f64; 2],
}

impl PointerSample {
    /// A pointer that did not move
    pub const fn stationary(position: [f64; 2]) -> Self {
        Self {
            position,
            previous: position,
        }
    }

    /// Movement since last frame
    pub fn delta(&self) -> [f64; 2] {
        [
            self.position[0] - self.previous[0],
            self.position[1] - self.previous[1],
        ]
    }

    /// Distance travelled since last frame
    pub fn travel(&self) -> f64 {
        let [dx, dy] = self.delta();
        dx.hypot(dy)
    }

    /// Grid cell under the pointer, possibly outside the grid
    pub fn grid_cell(&self, cell_size: u32) -> [i64; 2] {
        let size = f64::from(cell_size.max(1));
        [
            (self.position[0] / size).floor() as i64,
            (self.position[1] / size).floor() as i64,
        ]
    }
}

/// Hover radius in cells for a pointer travel in pixels
///
/// Travel over `[0, 100]` maps linearly onto `[low, high]` and keeps going
/// past `high` for faster movement. The result is truncated and never negative.
pub fn hover_radius(travel: f64, low: f64, high: f64) -> i64 {
    let radius = map_range(travel, 0.0, HOVER_TRAVEL_RANGE, low, high);
    if radius.is_finite() {
        (radius as i64).max(0)
    } else {
        0
    }
}

/// Cells inside the hover circle around the pointer
pub fn hovered_cells(
    grid: &CellGrid,
    pointer: &PointerSample,
    settings: &MosaicSettings,
) -> Vec<[usize; 2]> {
    let radius = hover_radius(
        pointer.travel(),
        settings.hover_radius_low,
        settings.hover_radius_high,
    );
    grid.cells_within_circle(pointer.grid_cell(settings.cell_size), radius)
}

/// Ghost blend: arm last-image influence and flash the previous image
///
/// Every hovered cell gets the configured influence. Cells whose frame draw
/// exceeds the commit threshold immediately show the previous image's pixel,
/// or black where the cell lies outside that image.
pub fn apply_ghost(
    grid: &mut CellGrid,
    hovered: &[[usize; 2]],
    sources: &SourcePair,
    settings: &MosaicSettings,
) {
    let offset = sources.current().offset();

    for &[x, y] in hovered {
        let Some(cell) = grid.cell_mut(x, y) else {
            continue;
        };

        cell.last_image_influence = settings.ghost_influence;

        if cell.frame_random > COMMIT_THRESHOLD {
            let [x, y] = source_coordinate(cell.position, offset, [0.0, 0.0]);
            cell.color = match sources.previous().sample(x, y) {
                Sample::Inside(color) => color,
                Sample::Border { .. } => OUTSIDE_COLOR,
            };
            cell.dirty = true;
        }
    }
}

/// Directional displacement against the pointer movement
///
/// Does nothing for a stationary pointer or for jumps at least as long as the
/// smaller canvas side minus a margin.
pub fn apply_directional_displacement(
    grid: &mut CellGrid,
    hovered: &[[usize; 2]],
    pointer: &PointerSample,
    canvas: (u32, u32),
    settings: &MosaicSettings,
) {
    let distance = pointer.travel();
    let cap = f64::from(canvas.0.min(canvas.1)) - POINTER_TRAVEL_MARGIN;
    if distance == 0.0 || distance >= cap {
        return;
    }

    let [dx, dy] = pointer.delta();
    let direction = [dx / distance, dy / distance];
    let push = [
        -direction[0] * settings.displacement_strength,
        -direction[1] * settings.displacement_strength,
    ];
    let cell_size = f64::from(settings.cell_size);

    for &[x, y] in hovered {
        let Some(cell) = grid.cell_mut(x, y) else {
            continue;
        };

        if settings.hover_effect.accumulates() {
            cell.displacement[0] += push[0];
            cell.displacement[1] += push[1];
        } else {
            cell.displacement = push;
        }

        let origin = [x as f64 * cell_size, y as f64 * cell_size];
        let pointer_distance =
            (pointer.position[0] - origin[0]).hypot(pointer.position[1] - origin[1]);
        let falloff = map_range(pointer_distance, 0.0, HOVER_TRAVEL_RANGE, 0.0, 1.0);

        cell.displacement[0] += direction[0] * falloff * DIRECTIONAL_FALLOFF_GAIN;
        cell.displacement[1] += direction[1] * falloff * DIRECTIONAL_FALLOFF_GAIN;
        cell.dirty = true;
    }
}

/// Run the configured pointer effects and return the number of hovered cells
pub fn apply_hover_effects(
    grid: &mut CellGrid,
    pointer: &PointerSample,
    sources: &SourcePair,
    canvas: (u32, u32),
    settings: &MosaicSettings,
) -> usize {
    let effect = settings.hover_effect;
    if effect == HoverEffect::None {
        return 0;
    }

    let hovered = hovered_cells(grid, pointer, settings);

    if effect.ghost() {
        apply_ghost(grid, &hovered, sources, settings);
    }
    if effect.displaces() {
        apply_directional_displacement(grid, &hovered, pointer, canvas, settings);
    }

    hovered.len()
}

/// Noise-driven displacement over the whole grid
///
/// The direction comes from two extra noise samples offset in time by 100 and
/// 200 and is scaled by the primary sample at the same position.
pub fn apply_global_displacement<N: NoiseField + ?Sized>(
    grid: &mut CellGrid,
    noise: &N,
    time: f64,
    settings: &MosaicSettings,
) {
    let gain = match settings.global_displacement {
        GlobalDisplacement::Off => return,
        GlobalDisplacement::Set => GLOBAL_SET_GAIN,
        GlobalDisplacement::Accumulate => GLOBAL_ACCUMULATE_GAIN,
    };
    let t = time * settings.noise_time_scale;

    for cell in grid.iter_mut() {
        let sx = cell.position[0] as f64 * settings.noise_scale;
        let sy = cell.position[1] as f64 * settings.noise_scale;

        let magnitude = noise.sample(sx, sy, t);
        let nx = noise.sample(sx, sy, t + GLOBAL_NOISE_OFFSET_X);
        let ny = noise.sample(sx, sy, t + GLOBAL_NOISE_OFFSET_Y);
        let vector = [nx * magnitude * gain, ny * magnitude * gain];

        if settings.global_displacement == GlobalDisplacement::Set {
            cell.displacement = vector;
        } else {
            cell.displacement[0] += vector[0];
            cell.displacement[1] += vector[1];
        }
    }
}

/// Step every cell's displacement one unit toward zero
pub fn decay_all_displacements(grid: &mut CellGrid) {
    for cell in grid.iter_mut() {
        if cell.is_displaced() {
            decay_displacement(&mut cell.displacement);
        }
    }
}
