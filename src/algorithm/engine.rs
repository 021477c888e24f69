//! Frame orchestration for the tile mosaic
//!
//! The engine owns the cell store, the palette, the source pair and the random
//! source, and runs the per-frame pipeline: frame draws, probability field,
//! update decision, pointer effects, global displacement, pixel resolution and
//! displacement decay.

use image::RgbImage;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

use crate::algorithm::decision::{decide_updates, visualize_probabilities};
use crate::algorithm::effects::{
    PointerSample, apply_global_displacement, apply_hover_effects, decay_all_displacements,
};
use crate::algorithm::field::build_probability_field;
use crate::algorithm::resolve::resolve_updates;
use crate::io::configuration::MosaicSettings;
use crate::io::error::{Result, invalid_parameter};
use crate::math::noise::{NoiseField, PerlinNoise};
use crate::spatial::grid::CellGrid;
use crate::spatial::palette::TilePalette;
use crate::spatial::source::SourcePair;

/// Inputs of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Monotonic session time in seconds
    pub time: f64,
    /// Pointer position, `None` when no pointer is present
    pub pointer: Option<PointerSample>,
}

/// Counters describing what a frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame, starting at 1
    pub frame: u64,
    /// Cells selected by the independent roll
    pub initial_updates: usize,
    /// Cells resolved after neighbor influence
    pub updated: usize,
    /// Cells inside the pointer hover circle
    pub hovered: usize,
    /// The frame painted the probability field instead
    pub debug: bool,
}

/// Snap a canvas size down to a whole number of cells
pub const fn snap_canvas(width: u32, height: u32, cell_size: u32) -> (u32, u32) {
    if cell_size == 0 {
        return (width, height);
    }
    (width - width % cell_size, height - height % cell_size)
}

/// Animated mosaic state and per-frame pipeline
pub struct MosaicEngine<N: NoiseField = PerlinNoise> {
    /// Live parameters, read fresh every frame
    pub settings: MosaicSettings,
    grid: CellGrid,
    palette: TilePalette,
    sources: Option<SourcePair>,
    noise: N,
    rng: StdRng,
    canvas: (u32, u32),
    cell_size: u32,
    frame: u64,
}

impl MosaicEngine<PerlinNoise> {
    /// Create an engine with Perlin noise seeded from `seed`
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the canvas holds no cell
    pub fn with_seed(
        settings: MosaicSettings,
        palette: TilePalette,
        canvas: (u32, u32),
        seed: u64,
    ) -> Result<Self> {
        Self::new(settings, palette, canvas, PerlinNoise::new(seed as u32), seed)
    }
}

impl<N: NoiseField> MosaicEngine<N> {
    /// Create an engine and size its grid for the canvas
    ///
    /// The canvas is snapped down to a multiple of the cell size. The engine is
    /// not ready until a source image is assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The settings fail validation
    /// - The snapped canvas holds no complete cell
    pub fn new(
        settings: MosaicSettings,
        palette: TilePalette,
        canvas: (u32, u32),
        noise: N,
        seed: u64,
    ) -> Result<Self> {
        settings.validate()?;

        let cell_size = settings.cell_size;
        let (canvas, grid) = size_grid(canvas, cell_size)?;
        log::info!(
            "Prepared grid with {}x{} cells ({} tiles in palette)",
            grid.cols(),
            grid.rows(),
            palette.len()
        );

        Ok(Self {
            settings,
            grid,
            palette,
            sources: None,
            noise,
            rng: StdRng::seed_from_u64(seed),
            canvas,
            cell_size,
            frame: 0,
        })
    }

    /// Make `image` the active source, keeping the old one as previous
    pub fn set_source(&mut self, image: Arc<RgbImage>) {
        let (cols, rows) = self.grid.dim();
        match &mut self.sources {
            Some(sources) => sources.assign(image, cols, rows),
            None => self.sources = Some(SourcePair::new(image, cols, rows)),
        }
        log::info!("Processed selected image");
    }

    /// Whether a source image has been assigned and frames will render
    pub const fn is_ready(&self) -> bool {
        self.sources.is_some()
    }

    /// Rebuild the grid for a new canvas size
    ///
    /// Applies the current cell size setting. Cell state is discarded and the
    /// source images are re-fitted to the new grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell size is zero or the canvas holds no cell
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let cell_size = self.settings.cell_size;
        let (canvas, grid) = size_grid((width, height), cell_size)?;

        self.canvas = canvas;
        self.cell_size = cell_size;
        self.grid = grid;
        let (cols, rows) = self.grid.dim();
        if let Some(sources) = &mut self.sources {
            sources.rescale(cols, rows);
        }

        log::info!("Resized grid to {cols}x{rows} cells");
        Ok(())
    }

    /// Run one frame of the pipeline
    ///
    /// Does nothing until a source image is assigned.
    pub fn update(&mut self, input: &FrameInput) -> FrameStats {
        let Some(sources) = &self.sources else {
            return FrameStats::default();
        };

        self.frame += 1;
        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        let mut settings = self.settings.clone();
        settings.cell_size = self.cell_size;

        for cell in self.grid.iter_mut() {
            cell.frame_random = self.rng.random::<f64>();
        }
        let draws = self.grid.frame_randoms();

        let probabilities =
            build_probability_field(&self.noise, self.grid.dim(), input.time, &settings);

        if settings.debug_visualize_noise {
            visualize_probabilities(&mut self.grid, &probabilities, &self.palette, &settings);
            stats.debug = true;
            return stats;
        }

        let decision = decide_updates(
            &draws,
            &probabilities,
            settings.neighbor_radius,
            settings.influence_increment(),
        );
        stats.initial_updates = decision.initial_updates;

        if let Some(pointer) = &input.pointer {
            stats.hovered = apply_hover_effects(
                &mut self.grid,
                pointer,
                sources,
                self.canvas,
                &settings,
            );
        }

        apply_global_displacement(&mut self.grid, &self.noise, input.time, &settings);

        stats.updated = resolve_updates(
            &mut self.grid,
            &decision.should_update,
            sources,
            &probabilities,
            &self.palette,
            &settings,
            &mut self.rng,
        );

        decay_all_displacements(&mut self.grid);

        log::trace!(
            "Frame {}: {} initial, {} updated, {} hovered",
            stats.frame,
            stats.initial_updates,
            stats.updated,
            stats.hovered
        );

        stats
    }

    /// Cell store
    pub const fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Mutable cell store, used by renderers to clear dirty flags
    pub const fn grid_mut(&mut self) -> &mut CellGrid {
        &mut self.grid
    }

    /// Tile palette
    pub const fn palette(&self) -> &TilePalette {
        &self.palette
    }

    /// Active source pair, once assigned
    pub const fn sources(&self) -> Option<&SourcePair> {
        self.sources.as_ref()
    }

    /// Canvas size in pixels, a whole number of cells
    pub const fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    /// Cell size the grid was built with
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of frames rendered so far
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

fn size_grid(canvas: (u32, u32), cell_size: u32) -> Result<((u32, u32), CellGrid)> {
    if cell_size == 0 {
        return Err(invalid_parameter(
            "cell_size",
            &cell_size,
            &"must be at least one pixel",
        ));
    }

    let snapped = snap_canvas(canvas.0, canvas.1, cell_size);
    if snapped.0 == 0 || snapped.1 == 0 {
        return Err(invalid_parameter(
            "canvas",
            &format!("{}x{}", canvas.0, canvas.1),
            &format!("must fit at least one {cell_size}px cell"),
        ));
    }

    let cols = (snapped.0 / cell_size) as usize;
    let rows = (snapped.1 / cell_size) as usize;
    Ok((snapped, CellGrid::new(cols, rows)))
}
