//! Progress bar styling.
//!
//! The main bar counts files of the current run and shows the file being
//! worked on as its message. Child bars follow single transfers in bytes.
//!
//! ```rust
//! use hubfetch::progress::{ProgressBarOpts, StyleOptions};
//!
//! let style = StyleOptions::new(
//!     ProgressBarOpts::new(
//!         Some("{pos}/{len} {wide_msg}".to_string()),
//!         None,
//!         true,
//!         false,
//!     ),
//!     ProgressBarOpts::hidden(),
//! );
//! assert!(style.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Options for the main bar and the per-file child bars.
///
/// By default the main bar stays on screen when done and child bars are
/// cleared as soon as their file is finished.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub(crate) main: ProgressBarOpts,
    pub(crate) child: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            main: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_FILES.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
                enabled: true,
                clear: false,
            },
            child: ProgressBarOpts::with_pip_style(),
        }
    }
}

impl StyleOptions {
    pub fn new(main: ProgressBarOpts, child: ProgressBarOpts) -> Self {
        Self { main, child }
    }

    /// Both bars hidden.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
    }

    pub fn set_main(&mut self, main: ProgressBarOpts) {
        self.main = main;
    }

    pub fn set_child(&mut self, child: ProgressBarOpts) {
        self.child = child;
    }

    /// `false` when neither bar is drawn.
    pub fn is_enabled(&self) -> bool {
        self.main.enabled || self.child.enabled
    }

    pub fn main(&self) -> &ProgressBarOpts {
        &self.main
    }

    pub fn child(&self) -> &ProgressBarOpts {
        &self.child
    }
}

/// Options for one progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    template: Option<String>,
    /// At least 3 characters: "filled", "current" and "to do".
    progress_chars: Option<String>,
    pub(crate) enabled: bool,
    /// Clear the bar once finished.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Files done out of the run's total, ETA, then the current file.
    ///
    /// `███████████▌            12/40 (30%) eta 00:03:10 model-00003.safetensors`
    pub const TEMPLATE_FILES: &'static str =
        "{bar:40.blue} {pos:>}/{len} ({percent}%) eta {eta_precise:.blue} {wide_msg}";
    /// Bytes of one transfer, like the Python package installer pip.
    ///
    /// `━━━━━━━━━━━━━━━╾──── 211.23 KiB/411.02 KiB 1008.31 KiB/s eta 0s config.json`
    pub const TEMPLATE_PIP: &'static str =
        "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} eta {eta:.blue} {msg}";
    /// `"█▉▊▋▌▍▎▏  "`
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// `"━╾╴─"`
    pub const CHARS_LINE: &'static str = "━╾╴─";
    /// `"█  "`
    pub const CHARS_ROUGH: &'static str = "█  ";

    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Builds the [`ProgressStyle`]. An invalid template falls back to the
    /// default bar with a warning.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            match ProgressStyle::default_bar().template(template) {
                Ok(s) => style = s,
                Err(e) => warn!("Ignoring progress template {:?}: {}", template, e),
            }
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// A styled bar of length `len`, or a hidden one when disabled.
    pub fn to_progress_bar(&self, len: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        ProgressBar::new(len).with_style(self.to_progress_style())
    }

    pub fn with_pip_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PIP.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_main_and_clears_children() {
        let style = StyleOptions::default();
        assert!(style.is_enabled());
        assert!(!style.main().clear);
        assert!(style.child().clear);
    }

    #[test]
    fn test_hidden() {
        let style = StyleOptions::hidden();
        assert!(!style.is_enabled());
        assert!(style.main().to_progress_bar(10).is_hidden());
    }

    #[test]
    fn test_invalid_template_does_not_panic() {
        let opts = ProgressBarOpts::new(Some("{bar:40.nope".into()), None, true, true);
        let bar = opts.to_progress_bar(5);
        assert_eq!(bar.length(), Some(5));
    }
}
