//! Common UI components.
//!
//! This module contains the header bar, status bar, help overlay and the
//! terminal-too-small notice.

use chrono::{DateTime, Local, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::{format_duration, format_elapsed};
use crate::data::NodeStatus;

/// "HH:MM:SS" plus a trailing space.
const CLOCK_WIDTH: u16 = 9;

/// Render the header bar with the node overview.
///
/// Displays: overall indicator, node counts by status, time to next refresh,
/// and the local time on the right.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.display.read();
    let (ok, stale, pending) = state.status_counts();
    let total = state.node_health().len();

    let overall = if stale > 0 {
        NodeStatus::Stale
    } else if pending > 0 {
        NodeStatus::Pending
    } else {
        NodeStatus::Ok
    };

    let refresh = match state.last_cycle() {
        Some(cycle) => {
            let since = cycle.finished_at.elapsed();
            if since >= app.interval {
                "refreshing...".to_string()
            } else {
                format!("next refresh in {}", format_elapsed(app.interval - since))
            }
        }
        None => "first poll in progress".to_string(),
    };

    let count = |n: usize, color: Color| {
        if n > 0 {
            Span::styled(n.to_string(), Style::default().fg(color))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("NODEMON ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count(ok, app.theme.healthy),
        Span::raw(" ok "),
        count(stale, app.theme.stale),
        Span::raw(" stale "),
        count(pending, app.theme.pending),
        Span::raw(" pending │ "),
        Span::styled(total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" nodes │ "),
        Span::raw(refresh),
    ]);

    let clock = format!("{} ", format_clock(&Local::now()));
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(CLOCK_WIDTH)])
            .areas(area);

    frame.render_widget(Paragraph::new(line), left);
    frame.render_widget(
        Paragraph::new(clock)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Right),
        right,
    );
}

/// Wall-clock time for the header, e.g. "14:03:27".
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

/// Render the status bar at the bottom.
///
/// Shows the last cycle result and available controls, the error of the
/// selected node when its values are stale, or a temporary message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let state = app.display.read();

    let selected_error = state
        .rows()
        .get(app.selected_row)
        .and_then(|row| state.health(row.key))
        .and_then(|h| h.last_error.as_ref().map(|e| (h, e)));

    if let Some((health, error)) = selected_error {
        let text = format!(
            " {}: {} (failed {} time{}) ",
            health.name,
            error,
            health.consecutive_failures,
            if health.consecutive_failures == 1 { "" } else { "s" }
        );
        let paragraph = Paragraph::new(text).style(app.theme.status_style(NodeStatus::Stale));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = match state.last_cycle() {
        Some(cycle) => format!(
            " Cycle #{}: {} ok, {} failed in {} | Updated {} ago | {} | ↑↓:select e:export ?:help q:quit",
            cycle.number,
            cycle.succeeded,
            cycle.failed,
            format_duration(cycle.elapsed),
            format_elapsed(cycle.finished_at.elapsed()),
            app.source_description(),
        ),
        None => format!(" Loading... | {} | q:quit", app.source_description()),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the table.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select node"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Wheel       Scroll"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  e           Export to JSON"),
        Line::from("  ?           Toggle help"),
        Line::from("  q Ctrl-C    Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(" Markers", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(vec![
            Span::styled("  ●", app.theme.status_style(NodeStatus::Ok)),
            Span::raw("           Latest fetch succeeded"),
        ]),
        Line::from(vec![
            Span::styled("  !", app.theme.status_style(NodeStatus::Stale)),
            Span::raw("           Showing last good values"),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the notice shown when the terminal is below the minimum size.
pub fn render_too_small(frame: &mut Frame, area: Rect, min_width: u16, min_height: u16) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min_width, min_height
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    let height = 5u16.min(area.height);
    let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, height);
    frame.render_widget(paragraph, centered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_clock() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = offset.with_ymd_and_hms(2024, 5, 1, 9, 4, 7).unwrap();
        assert_eq!(format_clock(&time), "09:04:07");
    }
}
