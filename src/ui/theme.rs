//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::NodeStatus;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for nodes whose latest fetch succeeded.
    pub healthy: Color,
    /// Color for nodes showing stale values.
    pub stale: Color,
    /// Color for nodes not fetched yet.
    pub pending: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Background for every other row.
    pub zebra: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            healthy: Color::Green,
            stale: Color::Yellow,
            pending: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            zebra: Style::default().bg(Color::Indexed(235)),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            healthy: Color::Green,
            stale: Color::Red,
            pending: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            zebra: Style::default().bg(Color::Indexed(254)),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a node status
    pub fn status_style(&self, status: NodeStatus) -> Style {
        match status {
            NodeStatus::Ok => Style::default().fg(self.healthy),
            NodeStatus::Stale => Style::default().fg(self.stale).add_modifier(Modifier::BOLD),
            NodeStatus::Pending => Style::default().fg(self.pending),
        }
    }

    /// Style applied to the values of a row whose latest fetch failed.
    pub fn stale_row(&self) -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }
}
