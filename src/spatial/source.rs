//! Source images: letterboxed scaling, clamped sampling and catalog navigation

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::sync::Arc;

use crate::io::error::{MosaicError, Result};

/// Largest (width, height) with the image aspect ratio that fits the grid
///
/// When the grid is relatively wider than the image the rows are the limit,
/// otherwise the columns are. Both dimensions are at least 1.
pub fn fit_within(image_width: u32, image_height: u32, cols: usize, rows: usize) -> (u32, u32) {
    let cols = cols.max(1) as f64;
    let rows = rows.max(1) as f64;
    if image_width == 0 || image_height == 0 {
        return (cols as u32, rows as u32);
    }

    let aspect = f64::from(image_width) / f64::from(image_height);
    let (width, height) = if cols / rows > aspect {
        (rows * aspect, rows)
    } else {
        (cols, cols / aspect)
    };

    ((width as u32).max(1), (height as u32).max(1))
}

/// Result of sampling a scaled source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// The coordinate was inside the image
    Inside(Rgb<u8>),
    /// The coordinate was outside and snapped to the nearest edge pixel
    Border {
        /// Color of the edge pixel
        color: Rgb<u8>,
        /// Image coordinate of the edge pixel
        pixel: [u32; 2],
    },
}

impl Sample {
    /// Sampled color regardless of where it came from
    pub const fn color(self) -> Rgb<u8> {
        match self {
            Self::Inside(color) | Self::Border { color, .. } => color,
        }
    }
}

/// A source image scaled to the grid and centered in it
#[derive(Debug, Clone)]
pub struct ScaledSource {
    image: RgbImage,
    offset: [i64; 2],
}

impl ScaledSource {
    /// Scale an image to fit a grid of `cols` x `rows` cells, one pixel per cell
    pub fn fit(original: &RgbImage, cols: usize, rows: usize) -> Self {
        let (width, height) = fit_within(original.width(), original.height(), cols, rows);
        let image = if original.width() == 0 || original.height() == 0 {
            RgbImage::new(width, height)
        } else {
            imageops::resize(original, width, height, FilterType::Triangle)
        };

        let offset = [
            (cols as i64 - i64::from(width)) / 2,
            (rows as i64 - i64::from(height)) / 2,
        ];

        Self { image, offset }
    }

    /// Letterbox offset of the image inside the grid (columns, rows)
    pub const fn offset(&self) -> [i64; 2] {
        self.offset
    }

    /// Scaled pixel data
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Sample the image, clamping out-of-bounds coordinates to the edge
    pub fn sample(&self, x: i64, y: i64) -> Sample {
        let max_x = i64::from(self.image.width()) - 1;
        let max_y = i64::from(self.image.height()) - 1;
        let clamped_x = x.clamp(0, max_x.max(0)) as u32;
        let clamped_y = y.clamp(0, max_y.max(0)) as u32;

        let color = self
            .image
            .get_pixel_checked(clamped_x, clamped_y)
            .copied()
            .unwrap_or(Rgb([0, 0, 0]));

        if x == i64::from(clamped_x) && y == i64::from(clamped_y) {
            Sample::Inside(color)
        } else {
            Sample::Border {
                color,
                pixel: [clamped_x, clamped_y],
            }
        }
    }
}

/// The active source image and the one it replaced
///
/// Replaced wholesale on every switch. On the first assignment the previous
/// image is the current one, so there is never a missing previous image.
#[derive(Debug, Clone)]
pub struct SourcePair {
    current: ScaledSource,
    previous: ScaledSource,
    current_original: Arc<RgbImage>,
    previous_original: Arc<RgbImage>,
}

impl SourcePair {
    /// Create a pair from the first source image
    pub fn new(original: Arc<RgbImage>, cols: usize, rows: usize) -> Self {
        let current = ScaledSource::fit(&original, cols, rows);
        Self {
            previous: current.clone(),
            current,
            previous_original: Arc::clone(&original),
            current_original: original,
        }
    }

    /// Switch to a new source image, keeping the old one as previous
    pub fn assign(&mut self, original: Arc<RgbImage>, cols: usize, rows: usize) {
        let current = ScaledSource::fit(&original, cols, rows);
        self.previous = std::mem::replace(&mut self.current, current);
        self.previous_original = std::mem::replace(&mut self.current_original, original);
    }

    /// Re-fit both images after the grid changed size
    pub fn rescale(&mut self, cols: usize, rows: usize) {
        self.current = ScaledSource::fit(&self.current_original, cols, rows);
        self.previous = ScaledSource::fit(&self.previous_original, cols, rows);
    }

    /// Image the mosaic converges toward
    pub const fn current(&self) -> &ScaledSource {
        &self.current
    }

    /// Image shown by the ghost effect and last-image blending
    pub const fn previous(&self) -> &ScaledSource {
        &self.previous
    }
}

/// One slot of the source catalog
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Display name, usually the file name
    pub name: String,
    /// Decoded image, `None` when loading failed
    pub image: Option<Arc<RgbImage>>,
}

impl SourceEntry {
    /// A successfully decoded entry
    pub fn loaded(name: impl Into<String>, image: RgbImage) -> Self {
        Self {
            name: name.into(),
            image: Some(Arc::new(image)),
        }
    }

    /// A placeholder for an image that failed to load
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
        }
    }
}

/// Ordered source images with cyclic navigation over the loadable ones
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    entries: Vec<SourceEntry>,
    current: usize,
}

impl SourceCatalog {
    /// Create a catalog positioned on the first loadable entry
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is empty or no entry loaded
    pub fn new(entries: Vec<SourceEntry>) -> Result<Self> {
        let current = entries
            .iter()
            .position(|entry| entry.image.is_some())
            .ok_or_else(|| MosaicError::EmptySourceSet {
                origin: format!("a catalog of {} entries", entries.len()),
            })?;

        Ok(Self { entries, current })
    }

    /// Index of the active entry
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Active entry
    pub fn current(&self) -> Option<&SourceEntry> {
        self.entries.get(self.current)
    }

    /// Active image
    pub fn current_image(&self) -> Option<Arc<RgbImage>> {
        self.current().and_then(|entry| entry.image.clone())
    }

    /// Jump to an entry by index
    ///
    /// Returns the image when the index exists and loaded; otherwise the
    /// catalog stays where it was.
    pub fn select(&mut self, index: usize) -> Option<Arc<RgbImage>> {
        let image = self.entries.get(index).and_then(|entry| entry.image.clone())?;
        self.current = index;
        Some(image)
    }

    /// Advance to the next loadable entry, wrapping around
    pub fn next(&mut self) -> Option<Arc<RgbImage>> {
        self.step(1)
    }

    /// Go back to the previous loadable entry, wrapping around
    pub fn previous(&mut self) -> Option<Arc<RgbImage>> {
        self.step(self.entries.len().saturating_sub(1))
    }

    /// Total number of entries, loaded or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that decoded successfully
    pub fn loadable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.image.is_some())
            .count()
    }

    fn step(&mut self, stride: usize) -> Option<Arc<RgbImage>> {
        let len = self.entries.len();
        let mut index = self.current;
        for _ in 0..len {
            index = (index + stride) % len;
            if let Some(image) = self.entries.get(index).and_then(|entry| entry.image.clone()) {
                self.current = index;
                return Some(image);
            }
        }
        None
    }
}

/// Fixed-interval trigger for automatic source switches
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSchedule {
    interval: Option<f64>,
    last_switch: f64,
}

impl SwitchSchedule {
    /// Create a schedule; `None` disables automatic switching
    pub const fn new(interval_secs: Option<f64>) -> Self {
        Self {
            interval: interval_secs,
            last_switch: 0.0,
        }
    }

    /// Check whether a switch is due at `now`, restarting the interval if so
    pub fn is_due(&mut self, now: f64) -> bool {
        match self.interval {
            Some(interval) if interval > 0.0 && now - self.last_switch >= interval => {
                self.last_switch = now;
                true
            }
            _ => false,
        }
    }

    /// Restart the interval after a manual switch
    pub const fn reset(&mut self, now: f64) {
        self.last_switch = now;
    }
}
