//! Frame progress display for rendering sessions

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

use crate::algorithm::engine::FrameStats;

static FRAME_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar over the frames of a session
///
/// Hidden entirely in quiet mode.
pub struct FrameProgress {
    bar: Option<ProgressBar>,
}

impl FrameProgress {
    /// Create a bar for `total` frames
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(FRAME_STYLE.clone());
            bar
        });
        Self { bar }
    }

    /// Show the name of the active source image
    pub fn set_source(&self, name: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_prefix(name.to_string());
        }
    }

    /// Advance by one frame and show its counters
    pub fn tick(&self, stats: &FrameStats) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
            if stats.debug {
                bar.set_message("noise view");
            } else {
                bar.set_message(format!("{:>5} updated", stats.updated));
            }
        }
    }

    /// Remove the bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }

    /// Whether the bar is displayed
    pub const fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}
