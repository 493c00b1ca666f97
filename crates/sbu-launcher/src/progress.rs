//! Console download progress.

use indicatif::{ProgressBar, ProgressStyle};
use sbu_updater::{ProgressSink, TransferProgress};

const TEMPLATE: &str = "Downloading: {bytes} of {total_bytes} [{bar:50}] {percent} %";

/// Progress bar on stderr, cleared when the download ends.
///
/// Nothing is drawn when stderr is not a terminal.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Creates a bar drawing to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Creates a bar that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    /// Current position and length.
    #[must_use]
    pub fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }

    /// Whether the bar has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&self, progress: TransferProgress) {
        if self.bar.length() != Some(progress.bytes_total) {
            self.bar.set_length(progress.bytes_total);
        }
        self.bar.set_position(progress.bytes_done);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
