//! Algorithm constants and the live settings surface with its defaults

use crate::algorithm::effects::{GlobalDisplacement, HoverEffect};
use crate::io::error::{Result, invalid_parameter};

// Probability field shaping
/// Steepness of the sigmoid applied to raw noise before range mapping
pub const SIGMOID_STEEPNESS: f64 = 10.0;

// Neighbor influence
/// Total influence an updating cell spreads over its neighborhood
pub const DEFAULT_INFLUENCE_BUDGET: f64 = 18.0;
/// Influence budget used by the wide-neighborhood presets
pub const WIDE_INFLUENCE_BUDGET: f64 = 9.0;
/// Gain applied to the neighbor-adjusted probability on re-roll
pub const REROLL_GAIN: f64 = 1.7;
/// Largest accepted neighborhood radius in cells
pub const MAX_NEIGHBOR_RADIUS: usize = 64;

// Per-cell commit strength, selected by the cached frame draw
/// Frame draw above which a cell commits strongly and the ghost flash fires
pub const COMMIT_THRESHOLD: f64 = 0.3;
/// Blend weight toward the resolved color for strongly committing cells
pub const STRONG_COMMIT_WEIGHT: f64 = 0.7;
/// Blend weight toward the resolved color for weakly committing cells
pub const WEAK_COMMIT_WEIGHT: f64 = 0.3;

// Brightness jitter during tile reselection
/// Chance that the target brightness gets a random offset
pub const BRIGHTNESS_JITTER_CHANCE: f64 = 0.1;
/// Maximum magnitude of the brightness offset
pub const BRIGHTNESS_JITTER: f64 = 20.0;
/// Upper end of the brightness scale
pub const MAX_BRIGHTNESS: f64 = 255.0;

// Border vignette
/// Brightest gray tone blended into out-of-image samples
pub const BORDER_GRAY_MAX: f64 = 60.0;
/// Weight of the gray tone in a border sample
pub const BORDER_GRAY_WEIGHT: f64 = 0.5;

// Pointer effects
/// Pointer travel (pixels per frame) mapped onto the full hover radius range
pub const HOVER_TRAVEL_RANGE: f64 = 100.0;
/// Subtracted from the smaller canvas side to cap valid pointer jumps
pub const POINTER_TRAVEL_MARGIN: f64 = 50.0;
/// Gain of the distance-scaled push along the pointer movement
pub const DIRECTIONAL_FALLOFF_GAIN: f64 = 5.0;

// Global displacement
/// Gain of the displacement vector when it replaces the cell displacement
pub const GLOBAL_SET_GAIN: f64 = 3.0;
/// Gain of the displacement vector when it accumulates every frame
pub const GLOBAL_ACCUMULATE_GAIN: f64 = 0.1;
/// Noise-time offset of the horizontal displacement sample
pub const GLOBAL_NOISE_OFFSET_X: f64 = 100.0;
/// Noise-time offset of the vertical displacement sample
pub const GLOBAL_NOISE_OFFSET_Y: f64 = 200.0;

// Canvas and grid
/// Edge length of a grid cell in pixels
pub const DEFAULT_CELL_SIZE: u32 = 25;
/// Default canvas width in pixels
pub const DEFAULT_CANVAS_WIDTH: u32 = 1500;
/// Default canvas height in pixels
pub const DEFAULT_CANVAS_HEIGHT: u32 = 900;

// Session
/// Fixed seed for reproducible sessions
pub const DEFAULT_SEED: u64 = 42;
/// Number of frames rendered by a session
pub const DEFAULT_FRAMES: usize = 600;
/// Frames per second of the session clock
pub const DEFAULT_FPS: u32 = 30;
/// Seconds between automatic source image switches
pub const DEFAULT_SWITCH_SECONDS: f64 = 120.0;
/// Worker threads used for bulk source image decoding
pub const LOAD_WORKERS: usize = 8;
/// File extensions recognized as images during directory scans
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "wbmp"];

// Output settings
/// Default path of the final rendered frame
pub const DEFAULT_OUTPUT: &str = "output.png";
/// Record every n-th frame into the animated GIF
pub const DEFAULT_CAPTURE_STRIDE: usize = 3;
/// Longest edge of recorded GIF frames in pixels
pub const GIF_MAX_DIMENSION: u32 = 600;

// Simulated pointer
/// Orbit radius as a fraction of the smaller canvas side
pub const ORBIT_RADIUS_FRACTION: f64 = 0.35;
/// Angular speed of the orbiting pointer in radians per second
pub const ORBIT_ANGULAR_SPEED: f64 = 0.8;
/// Sweep amplitude as a fraction of each canvas side
pub const SWEEP_AMPLITUDE_FRACTION: f64 = 0.4;

/// Live parameters of the frame pipeline
///
/// The engine reads these fresh every frame, so callers may change them at
/// any time between frames. Only [`MosaicSettings::validate`] checks them,
/// once at engine construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicSettings {
    /// Spatial frequency of the probability noise
    pub noise_scale: f64,
    /// Temporal frequency of the probability noise
    pub noise_time_scale: f64,
    /// Lowest per-frame update probability
    pub min_update_probability: f64,
    /// Highest per-frame update probability
    pub max_update_probability: f64,
    /// Chebyshev radius of the neighbor influence
    pub neighbor_radius: usize,
    /// Influence spread by one updating cell, divided among its neighbors
    pub influence_budget: f64,
    /// Pointer effect variant
    pub hover_effect: HoverEffect,
    /// Hover radius in cells for a stationary pointer
    pub hover_radius_low: f64,
    /// Hover radius in cells for a pointer travelling the full travel range
    pub hover_radius_high: f64,
    /// Last-image influence armed by the ghost effect
    pub ghost_influence: f64,
    /// Chance threshold choosing between the high and low influence reduction
    pub influence_reduction_chance: f64,
    /// Influence reduction when the coin flip stays under the chance
    pub influence_reduction_low: f64,
    /// Influence reduction when the coin flip exceeds the chance
    pub influence_reduction_high: f64,
    /// Strength of the pointer directional displacement
    pub displacement_strength: f64,
    /// Noise-driven displacement applied to the whole grid
    pub global_displacement: GlobalDisplacement,
    /// Replace the pipeline with a grayscale view of the probability field
    pub debug_visualize_noise: bool,
    /// Edge length of a grid cell in pixels
    pub cell_size: u32,
}

impl Default for MosaicSettings {
    fn default() -> Self {
        Self {
            noise_scale: 0.03,
            noise_time_scale: 0.2,
            min_update_probability: 0.01,
            max_update_probability: 0.05,
            neighbor_radius: 1,
            influence_budget: DEFAULT_INFLUENCE_BUDGET,
            hover_effect: HoverEffect::None,
            hover_radius_low: 0.0,
            hover_radius_high: 3.0,
            ghost_influence: 1.0,
            influence_reduction_chance: 0.5,
            influence_reduction_low: 0.0,
            influence_reduction_high: 0.3,
            displacement_strength: 10.0,
            global_displacement: GlobalDisplacement::Off,
            debug_visualize_noise: false,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl MosaicSettings {
    /// Numbered parameter presets
    ///
    /// Every preset starts from the defaults with the ghost effect enabled.
    /// Presets 2 and 3 widen the neighborhood with a halved influence budget,
    /// 4 and 5 switch to directional displacement with a larger hover radius
    /// and 6 combines ghost and displacement. Unknown indices behave like 1.
    pub fn preset(index: u8) -> Self {
        let mut settings = Self {
            hover_effect: HoverEffect::Ghost,
            ..Self::default()
        };

        match index {
            2 | 3 => {
                settings.min_update_probability = 0.0;
                settings.max_update_probability = 0.04;
                settings.neighbor_radius = usize::from(index);
                settings.influence_budget = WIDE_INFLUENCE_BUDGET;
            }
            4 => {
                settings.hover_effect = HoverEffect::DisplaceSet;
                settings.hover_radius_low = 3.0;
                settings.hover_radius_high = 8.0;
            }
            5 => {
                settings.hover_effect = HoverEffect::DisplaceAccumulate;
                settings.hover_radius_low = 3.0;
                settings.hover_radius_high = 8.0;
            }
            6 => settings.hover_effect = HoverEffect::Both,
            _ => {}
        }

        settings
    }

    /// Number of cells in the neighborhood, excluding the cell itself
    pub const fn neighbor_count(&self) -> usize {
        crate::spatial::grid::neighbor_count(self.neighbor_radius)
    }

    /// Adjustment added to each neighbor of an updating cell
    pub fn influence_increment(&self) -> f64 {
        self.influence_budget / self.neighbor_count() as f64
    }

    /// Check the parameters that make a session impossible
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The minimum update probability exceeds the maximum
    /// - The cell size is zero
    /// - The neighbor radius is zero or above [`MAX_NEIGHBOR_RADIUS`]
    pub fn validate(&self) -> Result<()> {
        if self.min_update_probability > self.max_update_probability {
            return Err(invalid_parameter(
                "min_update_probability",
                &self.min_update_probability,
                &format!(
                    "must not exceed max_update_probability ({})",
                    self.max_update_probability
                ),
            ));
        }

        if self.cell_size == 0 {
            return Err(invalid_parameter(
                "cell_size",
                &self.cell_size,
                &"must be at least one pixel",
            ));
        }

        if self.neighbor_radius == 0 {
            return Err(invalid_parameter(
                "neighbor_radius",
                &self.neighbor_radius,
                &"must be at least one cell",
            ));
        }

        if self.neighbor_radius > MAX_NEIGHBOR_RADIUS {
            return Err(invalid_parameter(
                "neighbor_radius",
                &self.neighbor_radius,
                &format!("must not exceed {MAX_NEIGHBOR_RADIUS} cells"),
            ));
        }

        Ok(())
    }
}
