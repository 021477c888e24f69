//! Brightness-indexed tile palette
//!
//! Tiles are kept in a vector sorted by average brightness. Lookups binary
//! search for the ceiling entry and fall back to the brightest tile, so every
//! query returns a valid tile.

use image::RgbaImage;

use crate::io::error::{MosaicError, Result};
use crate::math::color::average_brightness;

/// Index of a tile inside a [`TilePalette`]
///
/// Cells hold these as weak references: the palette owns the images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(usize);

impl TileId {
    /// Position of the tile in brightness order
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One palette entry
#[derive(Debug, Clone)]
pub struct PaletteTile {
    /// Average brightness in `[0, 255]`
    pub brightness: f64,
    /// Tile texture
    pub image: RgbaImage,
}

/// Tiles ordered by brightness with total nearest-match lookup
#[derive(Debug, Clone)]
pub struct TilePalette {
    tiles: Vec<PaletteTile>,
}

impl TilePalette {
    /// Build a palette with a custom brightness function
    ///
    /// # Errors
    ///
    /// Returns an error if `images` is empty
    pub fn build<F>(images: Vec<RgbaImage>, brightness_fn: F) -> Result<Self>
    where
        F: Fn(&RgbaImage) -> f64,
    {
        if images.is_empty() {
            return Err(MosaicError::EmptyTilePalette {
                origin: "palette input".to_string(),
            });
        }

        let mut tiles: Vec<PaletteTile> = images
            .into_iter()
            .map(|image| PaletteTile {
                brightness: brightness_fn(&image),
                image,
            })
            .collect();

        tiles.sort_by(|a, b| a.brightness.total_cmp(&b.brightness));

        Ok(Self { tiles })
    }

    /// Build a palette keyed by mean pixel brightness
    ///
    /// # Errors
    ///
    /// Returns an error if `images` is empty
    pub fn from_images(images: Vec<RgbaImage>) -> Result<Self> {
        Self::build(images, average_brightness)
    }

    /// Tile with the least brightness `>= target`, else the brightest tile
    pub fn nearest(&self, target: f64) -> TileId {
        let ceiling = self.tiles.partition_point(|tile| tile.brightness < target);
        if ceiling < self.tiles.len() {
            TileId(ceiling)
        } else {
            TileId(self.tiles.len().saturating_sub(1))
        }
    }

    /// Palette entry for an id
    pub fn tile(&self, id: TileId) -> Option<&PaletteTile> {
        self.tiles.get(id.0)
    }

    /// Brightness of the entry for an id
    pub fn brightness(&self, id: TileId) -> Option<f64> {
        self.tile(id).map(|tile| tile.brightness)
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false for a constructed palette
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate over the tiles in brightness order
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &PaletteTile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (TileId(index), tile))
    }
}
