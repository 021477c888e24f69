//! Mathematical utilities for the mosaic pipeline

/// Brightness and linear RGB blending
pub mod color;
/// Coherent noise sampling over space and time
pub mod noise;
/// Probability shaping and range mapping
pub mod probability;
