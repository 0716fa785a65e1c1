//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner shown while a version is being assembled
#[derive(Debug)]
pub struct ProgressReporter {
    spinner: Option<ProgressBar>,
    show_progress: bool,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create progress reporter for version creation
    pub fn new_for_create() -> Self {
        Self {
            spinner: None,
            show_progress: true,
            start_time: Instant::now(),
        }
    }

    /// Create minimal progress reporter (no spinner)
    pub fn new_minimal() -> Self {
        Self {
            spinner: None,
            show_progress: false,
            start_time: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.show_progress
    }

    /// Move to the next stage, creating the spinner on first use
    pub fn stage(&mut self, message: &str) {
        if !self.show_progress {
            return;
        }
        match &self.spinner {
            Some(pb) => pb.set_message(message.to_string()),
            None => self.spinner = Some(create_spinner(message)),
        }
    }

    /// Stop the spinner, leaving a final message
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
