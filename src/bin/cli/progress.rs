//! Progress display for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use xarc::{CancelFlag, ProgressReporter};

/// Spinner showing the entry being processed.
///
/// Clones share the same spinner, so one clone can be handed to the library
/// while the command keeps another to finish the display.
#[derive(Clone)]
pub struct CliProgress {
    bar: ProgressBar,
    cancel: CancelFlag,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool, cancel: CancelFlag) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} entries {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };

        Self { bar, cancel }
    }

    /// Sets a message on the spinner
    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        // Truncate long names
        let chars: Vec<char> = entry_name.chars().collect();
        let display_name = if chars.len() > 40 {
            format!("...{}", chars[chars.len() - 37..].iter().collect::<String>())
        } else {
            entry_name.to_string()
        };
        self.bar.set_message(display_name);
    }

    fn on_entry_complete(&mut self, _entry_name: &str, success: bool) {
        // Failures are reported once, by the command.
        if success {
            self.bar.inc(1);
        }
    }

    fn on_warning(&mut self, message: &str) {
        self.bar.suspend(|| eprintln!("Warning: {}", message));
    }

    fn should_cancel(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
