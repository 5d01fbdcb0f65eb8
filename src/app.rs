//! Application state and navigation logic for the TUI.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::watch;

use crate::data::export::write_export;
use crate::data::DisplayReader;
use crate::shutdown;
use crate::ui::Theme;

/// How long a temporary status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
///
/// The app never writes node data: it reads the display state published by
/// the polling task and keeps only view state (selection, overlays).
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data
    pub display: DisplayReader,
    pub interval: Duration,
    source_description: String,

    // Navigation state
    pub selected_row: usize,

    // UI
    pub theme: Theme,
    started_at: Instant,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    // Set by OS signals
    shutdown: Option<watch::Receiver<bool>>,
}

impl App {
    /// Create a new App reading from `display`.
    pub fn new(display: DisplayReader, source_description: &str, interval: Duration) -> Self {
        Self::with_theme(display, source_description, interval, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (skips terminal detection).
    pub fn with_theme(
        display: DisplayReader,
        source_description: &str,
        interval: Duration,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            display,
            interval,
            source_description: source_description.to_string(),
            selected_row: 0,
            theme,
            started_at: Instant::now(),
            status_message: None,
            shutdown: None,
        }
    }

    /// Also stop when `shutdown` turns `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Whether the main loop should keep going.
    pub fn is_running(&self) -> bool {
        self.running && !self.shutdown.as_ref().is_some_and(shutdown::requested)
    }

    /// Returns a description of the status source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Consume a pending display change, if any.
    ///
    /// Returns `true` when the polling task published new data since the
    /// last call; the selection is clamped to the new row count.
    pub fn sync_display(&mut self) -> bool {
        if !self.display.take_change() {
            return false;
        }
        let rows = self.row_count();
        if self.selected_row >= rows {
            self.selected_row = rows.saturating_sub(1);
        }
        true
    }

    /// Number of rows currently displayed.
    pub fn row_count(&self) -> usize {
        self.display.read().rows().len()
    }

    /// Whether the first polling pass has completed.
    pub fn is_ready(&self) -> bool {
        self.display.read().is_ready()
    }

    /// Time since the app started, used to animate the loading indicator.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one row.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n rows.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.row_count().saturating_sub(1);
        self.selected_row = (self.selected_row + n).min(max);
    }

    /// Move selection up by n rows.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_row = self.selected_row.saturating_sub(n);
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        self.selected_row = 0;
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        self.selected_row = self.row_count().saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current table to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let state = self.display.read();
        if !state.is_ready() {
            anyhow::bail!("No data to export yet");
        }
        write_export(&state, path)
    }
}
