//! Animated photo mosaic that reproduces images from a palette of small tiles
//!
//! Each grid cell refreshes stochastically under a drifting noise field, picks
//! the tile whose brightness best matches its sampled source pixel and eases
//! its tint toward that pixel. Pointer effects and noise-driven displacement
//! distort the sampling, and switching sources cross-fades between images.

#![forbid(unsafe_code)]

/// Per-frame pipeline: probability field, update decision, effects and resolution
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Color, probability and noise utilities
pub mod math;
/// Cell grid, tile palette and source image management
pub mod spatial;

pub use io::error::{MosaicError, Result};
