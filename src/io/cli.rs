//! Command-line interface for rendering mosaic sessions to image files

use crate::algorithm::effects::{GlobalDisplacement, HoverEffect};
use crate::algorithm::engine::{FrameInput, MosaicEngine};
use crate::io::configuration::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_CAPTURE_STRIDE, DEFAULT_CELL_SIZE,
    DEFAULT_FPS, DEFAULT_FRAMES, DEFAULT_OUTPUT, DEFAULT_SEED, DEFAULT_SWITCH_SECONDS,
    LOAD_WORKERS, MosaicSettings,
};
use crate::io::error::{MosaicError, Result};
use crate::io::loading::{load_sources, load_tiles};
use crate::io::pointer::PointerPath;
use crate::io::progress::FrameProgress;
use crate::io::render::{GifRecorder, MosaicRenderer, export_png};
use crate::spatial::palette::TilePalette;
use crate::spatial::source::{SourceCatalog, SwitchSchedule};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tilemosaic")]
#[command(
    author,
    version,
    about = "Render animated photo mosaics from a folder of tile images"
)]
/// Command-line arguments for a rendering session
pub struct Cli {
    /// Directory of tile images forming the palette
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Directory of source images to reproduce
    #[arg(value_name = "IMAGES")]
    pub images: PathBuf,

    /// Path of the final rendered frame
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Also record the session as an animated GIF
    #[arg(short, long, value_name = "GIF")]
    pub gif: Option<PathBuf>,

    /// Number of frames to render
    #[arg(short, long, default_value_t = DEFAULT_FRAMES)]
    pub frames: usize,

    /// Frames per second of the session clock
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Random seed for reproducible sessions
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Canvas width in pixels
    #[arg(short = 'w', long, default_value_t = DEFAULT_CANVAS_WIDTH)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_CANVAS_HEIGHT)]
    pub height: u32,

    /// Edge length of a grid cell in pixels
    #[arg(short, long, default_value_t = DEFAULT_CELL_SIZE)]
    pub cell_size: u32,

    /// Start from a numbered parameter preset
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub preset: Option<u8>,

    /// Pointer effect, overriding the preset
    #[arg(short, long, value_enum)]
    pub effect: Option<HoverEffect>,

    /// Noise-driven displacement of the whole grid
    #[arg(long, value_enum)]
    pub global_displacement: Option<GlobalDisplacement>,

    /// Lowest per-frame update probability
    #[arg(long)]
    pub min_probability: Option<f64>,

    /// Highest per-frame update probability
    #[arg(long)]
    pub max_probability: Option<f64>,

    /// Neighborhood radius of the update influence
    #[arg(long)]
    pub neighbor_radius: Option<usize>,

    /// Paint the update probability field instead of the mosaic
    #[arg(short, long)]
    pub debug_noise: bool,

    /// Seconds between automatic source switches, 0 disables
    #[arg(long, default_value_t = DEFAULT_SWITCH_SECONDS)]
    pub switch_every: f64,

    /// Index of the first source image
    #[arg(long, default_value_t = 0)]
    pub start_index: usize,

    /// Simulated pointer movement
    #[arg(long, value_enum, default_value_t = PointerPath::Orbit)]
    pub pointer: PointerPath,

    /// Record every n-th frame into the GIF
    #[arg(long, default_value_t = DEFAULT_CAPTURE_STRIDE)]
    pub capture_stride: usize,

    /// Worker threads for source image decoding
    #[arg(long, default_value_t = LOAD_WORKERS)]
    pub workers: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Settings from the preset with command-line overrides applied
    pub fn settings(&self) -> MosaicSettings {
        let mut settings = self
            .preset
            .map_or_else(MosaicSettings::default, MosaicSettings::preset);

        if let Some(effect) = self.effect {
            settings.hover_effect = effect;
        }
        if let Some(mode) = self.global_displacement {
            settings.global_displacement = mode;
        }
        if let Some(min) = self.min_probability {
            settings.min_update_probability = min;
        }
        if let Some(max) = self.max_probability {
            settings.max_update_probability = max;
        }
        if let Some(radius) = self.neighbor_radius {
            settings.neighbor_radius = radius;
        }
        settings.debug_visualize_noise = self.debug_noise;
        settings.cell_size = self.cell_size;

        settings
    }

    /// Automatic switch interval, `None` when disabled
    pub fn switch_interval(&self) -> Option<f64> {
        (self.switch_every > 0.0).then_some(self.switch_every)
    }

    /// Duration of one session frame in seconds
    pub fn frame_seconds(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }

    /// Display delay of one recorded GIF frame
    pub fn frame_delay_ms(&self) -> u32 {
        let stride = u32::try_from(self.capture_stride.max(1)).unwrap_or(u32::MAX);
        stride.saturating_mul(1000) / self.fps.max(1)
    }
}

/// Runs one rendering session from loading to export
pub struct SessionRunner {
    cli: Cli,
    progress: FrameProgress,
}

impl SessionRunner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = FrameProgress::new(cli.frames, cli.quiet);
        Self { cli, progress }
    }

    /// Load the image sets, render every frame and write the outputs
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either image directory is unreadable or yields no usable image
    /// - The settings or canvas size are invalid
    /// - The PNG or GIF output cannot be written
    pub fn run(&self) -> Result<()> {
        let palette = TilePalette::from_images(load_tiles(&self.cli.tiles)?)?;
        let mut catalog = load_sources(&self.cli.images, self.cli.workers)?;

        if self.cli.start_index != catalog.current_index()
            && catalog.select(self.cli.start_index).is_none()
        {
            log::warn!(
                "Image {} is not loadable, starting at {}",
                self.cli.start_index,
                catalog.current_index()
            );
        }

        let first = catalog
            .current_image()
            .ok_or_else(|| MosaicError::EmptySourceSet {
                origin: self.cli.images.display().to_string(),
            })?;

        let mut engine = MosaicEngine::with_seed(
            self.cli.settings(),
            palette,
            (self.cli.width, self.cli.height),
            self.cli.seed,
        )?;
        engine.set_source(first);
        self.announce_source(&catalog);

        let mut renderer =
            MosaicRenderer::new(engine.palette(), engine.canvas_size(), engine.cell_size());
        let mut recorder = self
            .cli
            .gif
            .as_deref()
            .map(|path| GifRecorder::create(path, self.cli.frame_delay_ms()))
            .transpose()?;

        let mut schedule = SwitchSchedule::new(self.cli.switch_interval());
        let dt = self.cli.frame_seconds();
        let stride = self.cli.capture_stride.max(1);

        for frame in 0..self.cli.frames {
            let time = frame as f64 * dt;

            if schedule.is_due(time)
                && let Some(image) = catalog.next()
            {
                engine.set_source(image);
                self.announce_source(&catalog);
            }

            let pointer = self.cli.pointer.sample(time, time - dt, engine.canvas_size());
            let stats = engine.update(&FrameInput { time, pointer });
            renderer.render(engine.grid_mut());

            if frame % stride == 0
                && let Some(recorder) = recorder.as_mut()
            {
                recorder.capture(renderer.canvas())?;
            }

            self.progress.tick(&stats);
        }

        self.progress.finish();

        export_png(renderer.canvas(), &self.cli.output)?;
        if let Some(recorder) = recorder {
            recorder.finish()?;
        }

        Ok(())
    }

    fn announce_source(&self, catalog: &SourceCatalog) {
        if let Some(entry) = catalog.current() {
            log::info!("Showing image {}: {}", catalog.current_index(), entry.name);
            self.progress.set_source(&entry.name);
        }
    }
}
