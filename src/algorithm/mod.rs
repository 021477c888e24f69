/// Three-pass update decision and the debug probability view
pub mod decision;
/// Pointer effects, global displacement and displacement decay
pub mod effects;
/// Frame orchestration
pub mod engine;
/// Noise-driven update probability field
pub mod field;
/// Pixel resolution, tile reselection and color blending
pub mod resolve;
