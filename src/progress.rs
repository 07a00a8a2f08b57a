//! Progress tracking and display using indicatif
//!
//! This module provides unified progress bar functionality
//! for batch label generation and archiving.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Progress tracker for label generation runs
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a progress bar for per-record operations
    pub fn create_record_progress(&self, total: usize, operation: &str) -> Option<ProgressBar> {
        if !self.enabled || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ ")
        );
        pb.set_message(format!("{}...", operation));
        pb.enable_steady_tick(Duration::from_millis(100));

        info!("Started progress tracking for: {}", operation);
        Some(pb)
    }

    /// Create a spinner for indeterminate operations
    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));

        info!("Started spinner for: {}", message);
        Some(pb)
    }

    /// Create a progress bar for archive creation
    pub fn create_archive_progress(&self, total: usize) -> Option<ProgressBar> {
        self.create_record_progress(total, "Creating archive")
    }

    /// Update progress and optionally change message
    pub fn update_progress(pb: &Option<ProgressBar>, increment: u64, message: Option<&str>) {
        if let Some(ref progress) = pb {
            progress.inc(increment);
            if let Some(msg) = message {
                progress.set_message(msg.to_string());
            }
        }
    }

    /// Finish progress with success message
    pub fn finish_progress(pb: Option<ProgressBar>, success_message: &str) {
        if let Some(progress) = pb {
            progress.finish_with_message(success_message.to_string());
            info!("Progress completed: {}", success_message);
        }
    }

    /// Finish progress with error message
    pub fn finish_with_error(pb: Option<ProgressBar>, error_message: &str) {
        if let Some(progress) = pb {
            progress.abandon_with_message(format!("❌ {}", error_message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_creation() {
        let enabled_tracker = ProgressTracker::new(true);
        let disabled_tracker = ProgressTracker::new(false);

        assert!(enabled_tracker.enabled);
        assert!(!disabled_tracker.enabled);
    }

    #[test]
    fn test_progress_bar_creation_when_disabled() {
        let tracker = ProgressTracker::new(false);
        let pb = tracker.create_record_progress(10, "test operation");

        assert!(pb.is_none());
    }

    #[test]
    fn test_progress_bar_creation_when_enabled() {
        let tracker = ProgressTracker::new(true);
        let pb = tracker.create_record_progress(10, "test operation");

        assert!(pb.is_some());
    }

    #[test]
    fn test_zero_total_progress() {
        let tracker = ProgressTracker::new(true);
        let pb = tracker.create_record_progress(0, "empty operation");

        assert!(pb.is_none());
    }

    #[test]
    fn test_spinner_creation() {
        let enabled_tracker = ProgressTracker::new(true);
        let disabled_tracker = ProgressTracker::new(false);

        let enabled_spinner = enabled_tracker.create_spinner("Rendering...");
        let disabled_spinner = disabled_tracker.create_spinner("Rendering...");

        assert!(enabled_spinner.is_some());
        assert!(disabled_spinner.is_none());
    }
}
