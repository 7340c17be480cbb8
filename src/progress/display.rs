//! Console progress for one run.
//!
//! ```rust,no_run
//! use hubfetch::progress::{ProgressDisplay, StyleOptions};
//!
//! let display = ProgressDisplay::new(StyleOptions::default(), 2);
//! let child = display.create_child_progress("config.json");
//! child.set_length(1024);
//! child.set_position(1024);
//! display.finish_child(child);
//! display.advance("config.json");
//! display.finish();
//! ```

use crate::progress::StyleOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use tracing::debug;

/// A main bar counting the files of a run plus one child bar per transfer.
pub struct ProgressDisplay {
    multi: MultiProgress,
    main: ProgressBar,
    style_options: StyleOptions,
}

impl ProgressDisplay {
    /// `total_files` is the number of files this run will process.
    pub fn new(style_options: StyleOptions, total_files: usize) -> Self {
        let multi = match style_options.is_enabled() {
            true => MultiProgress::new(),
            false => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        let main = multi.add(style_options.main().to_progress_bar(total_files as u64));
        main.tick();

        Self {
            multi,
            main,
            style_options,
        }
    }

    pub fn main(&self) -> &ProgressBar {
        &self.main
    }

    /// A byte-level bar for `path`. Length and position are set by the
    /// fetcher once the response headers are known.
    pub fn create_child_progress(&self, path: &str) -> ProgressBar {
        let bar = self
            .multi
            .add(self.style_options.child().to_progress_bar(0));
        bar.set_message(path.to_string());
        bar
    }

    pub fn finish_child(&self, pb: ProgressBar) {
        if self.style_options.child().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
        self.multi.remove(&pb);
    }

    /// Counts one processed file and shows it as the current one.
    pub fn advance(&self, path: &str) {
        self.main.set_message(path.to_string());
        self.main.inc(1);
    }

    /// Prints a line above the bars without tearing them.
    pub fn println(&self, line: &str) {
        if self.style_options.is_enabled() {
            if let Err(e) = self.multi.println(line) {
                debug!("Could not print above the progress bars: {}", e);
            }
        }
    }

    pub fn finish(self) {
        if self.style_options.main().clear {
            self.main.finish_and_clear();
        } else {
            self.main.finish_with_message("done");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_files() {
        let display = ProgressDisplay::new(StyleOptions::hidden(), 3);
        display.advance("a.bin");
        display.advance("b.bin");
        assert_eq!(display.main().position(), 2);
        let child = display.create_child_progress("c.bin");
        display.finish_child(child);
        display.finish();
    }

    #[test]
    fn test_println_with_visible_bars() {
        let display = ProgressDisplay::new(StyleOptions::default(), 1);
        display.println("✗ broken.bin: connection reset");
        display.advance("broken.bin");
        assert_eq!(display.main().position(), 1);
        display.finish();
    }
}
