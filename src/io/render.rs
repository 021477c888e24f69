//! Tile compositing onto the canvas, PNG export and GIF recording

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, Rgb, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::io::configuration::GIF_MAX_DIMENSION;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::spatial::grid::CellGrid;
use crate::spatial::palette::TilePalette;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Multiply a tile pixel by a tint and composite it over black
pub fn tint_pixel(pixel: Rgba<u8>, tint: Rgb<u8>) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = pixel;
    let Rgb([tr, tg, tb]) = tint;
    let alpha = u32::from(a);
    let channel = |c: u8, t: u8| (u32::from(c) * u32::from(t) * alpha / (255 * 255)) as u8;
    Rgba([channel(r, tr), channel(g, tg), channel(b, tb), 255])
}

/// Canvas painter that redraws only the cells flagged dirty
pub struct MosaicRenderer {
    canvas: RgbaImage,
    tiles: Vec<RgbaImage>,
    cell_size: u32,
}

impl MosaicRenderer {
    /// Create a black canvas and pre-scale every palette tile to the cell size
    pub fn new(palette: &TilePalette, canvas: (u32, u32), cell_size: u32) -> Self {
        let tiles = palette
            .iter()
            .map(|(_, tile)| imageops::resize(&tile.image, cell_size, cell_size, FilterType::Triangle))
            .collect();

        Self {
            canvas: RgbaImage::from_pixel(canvas.0, canvas.1, BACKGROUND),
            tiles,
            cell_size,
        }
    }

    /// Draw every dirty cell, clear its flag and return how many were drawn
    ///
    /// A cell without a tile is painted black.
    pub fn render(&mut self, grid: &mut CellGrid) -> usize {
        let size = self.cell_size;
        let mut drawn = 0;

        for cell in grid.dirty_cells_mut() {
            let origin_x = cell.position[0] as u32 * size;
            let origin_y = cell.position[1] as u32 * size;
            let tile = cell.tile.and_then(|id| self.tiles.get(id.index()));

            for ty in 0..size {
                for tx in 0..size {
                    let color = tile
                        .and_then(|image| image.get_pixel_checked(tx, ty))
                        .map_or(BACKGROUND, |&pixel| tint_pixel(pixel, cell.color));
                    if let Some(target) = self.canvas.get_pixel_mut_checked(origin_x + tx, origin_y + ty) {
                        *target = color;
                    }
                }
            }

            cell.dirty = false;
            drawn += 1;
        }

        drawn
    }

    /// Current canvas
    pub const fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}

/// Save a canvas as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn export_png(canvas: &RgbaImage, path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    canvas.save(path).map_err(|e| MosaicError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })?;

    log::info!("Saved {}", path.display());
    Ok(())
}

/// Downscale a canvas so its longest edge fits a recorded frame
pub fn recording_frame(canvas: &RgbaImage) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    let longest = width.max(height);
    if longest <= GIF_MAX_DIMENSION {
        return canvas.clone();
    }

    let scale = f64::from(GIF_MAX_DIMENSION) / f64::from(longest);
    let scaled_width = ((f64::from(width) * scale).round() as u32).max(1);
    let scaled_height = ((f64::from(height) * scale).round() as u32).max(1);
    imageops::resize(canvas, scaled_width, scaled_height, FilterType::Triangle)
}

/// Animated GIF writer that encodes frames as they are captured
pub struct GifRecorder {
    encoder: GifEncoder<BufWriter<File>>,
    path: PathBuf,
    delay: Delay,
    frames: usize,
}

impl GifRecorder {
    /// Open the output file and prepare a looping animation
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created
    pub fn create(path: &Path, frame_delay_ms: u32) -> Result<Self> {
        create_parent_dir(path)?;

        let file = File::create(path).map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| MosaicError::ImageExport {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            encoder,
            path: path.to_path_buf(),
            delay: Delay::from_numer_denom_ms(frame_delay_ms.max(1), 1),
            frames: 0,
        })
    }

    /// Encode one canvas snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be encoded
    pub fn capture(&mut self, canvas: &RgbaImage) -> Result<()> {
        let frame = Frame::from_parts(recording_frame(canvas), 0, 0, self.delay);
        self.encoder
            .encode_frame(frame)
            .map_err(|e| MosaicError::ImageExport {
                path: self.path.clone(),
                source: e,
            })?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames encoded so far
    pub const fn frame_count(&self) -> usize {
        self.frames
    }

    /// Close the animation and return the number of frames written
    ///
    /// # Errors
    ///
    /// Returns an error if no frame was captured
    pub fn finish(self) -> Result<usize> {
        if self.frames == 0 {
            return Err(invalid_parameter(
                "recording",
                &self.path.display(),
                &"no frames were captured",
            ));
        }

        log::info!("Saved {} frames to {}", self.frames, self.path.display());
        Ok(self.frames)
    }
}
