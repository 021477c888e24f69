/// Command-line parsing and session orchestration
pub mod cli;
/// Algorithm constants and live settings
pub mod configuration;
/// Error types for mosaic operations
pub mod error;
/// Directory scanning and bulk image decoding
pub mod loading;
/// Scripted pointer paths
pub mod pointer;
/// Frame progress display
pub mod progress;
/// Canvas compositing, PNG export and GIF recording
pub mod render;
