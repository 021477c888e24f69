//! Spatial data structures of the mosaic
//!
//! This module contains:
//! - The grid cell store
//! - The brightness-indexed tile palette
//! - Source image scaling, sampling and catalog navigation

/// Grid cell store and neighborhood helpers
pub mod grid;
/// Brightness-indexed tile palette
pub mod palette;
/// Source image pair, catalog and switch schedule
pub mod source;

pub use grid::{CellGrid, GridCell};
pub use palette::{TileId, TilePalette};
