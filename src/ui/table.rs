//! Node table rendering.
//!
//! Shows a loading indicator until the first polling pass completes, then
//! one row per node in configuration order. Rows are updated in place, so
//! refreshes never reorder or blank them.

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_elapsed;
use crate::data::{DisplayState, NodeStatus, COLUMNS};

/// Spinner frames for the loading indicator.
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the node table, or the loading indicator before the first pass.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.display.read();

    if !state.is_ready() {
        render_loading(frame, app, &state, area);
        return;
    }

    let block = Block::default()
        .title(title(app, &state))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if state.rows().is_empty() {
        let paragraph = Paragraph::new("No node has responded yet. Retrying on the next cycle.")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(
        std::iter::once(Cell::from(" "))
            .chain(COLUMNS.iter().map(|c| Cell::from(c.title)))
            .collect::<Vec<_>>(),
    )
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = state
        .rows()
        .iter()
        .enumerate()
        .map(|(visual, row)| {
            let status = state
                .health(row.key)
                .map(|h| h.status())
                .unwrap_or(NodeStatus::Pending);

            let marker = match status {
                NodeStatus::Stale => "!",
                _ => "●",
            };

            let cells = std::iter::once(
                Cell::from(marker).style(app.theme.status_style(status)),
            )
            .chain(row.values.iter().map(|v| Cell::from(v.to_string())));

            let mut style = if visual % 2 == 1 {
                app.theme.zebra
            } else {
                Style::default()
            };
            if status == NodeStatus::Stale {
                style = style.patch(app.theme.stale_row());
            }

            Row::new(cells.collect::<Vec<_>>()).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(1))
        .chain(COLUMNS.iter().map(|c| Constraint::Min(c.min_width)))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default();
    table_state.select(Some(app.selected_row.min(state.rows().len() - 1)));

    frame.render_stateful_widget(table, area, &mut table_state);
}

fn title(app: &App, state: &DisplayState) -> String {
    let total = state.node_health().len();
    let position = if state.rows().is_empty() {
        String::new()
    } else {
        format!(
            " [{}/{}]",
            app.selected_row.min(state.rows().len() - 1) + 1,
            state.rows().len()
        )
    };
    format!(" Nodes ({}/{}){} ", state.rows().len(), total, position)
}

/// Spinner frame for `uptime`, advancing every 100ms.
fn spinner_frame(uptime: Duration) -> usize {
    let ticks = uptime.as_millis() / 100;
    // Always below SPINNER.len(), so the conversion cannot fail.
    usize::try_from(ticks % SPINNER.len() as u128).unwrap_or(0)
}

fn render_loading(frame: &mut Frame, app: &App, state: &DisplayState, area: Rect) {
    let frame_index = spinner_frame(app.uptime());

    let text = vec![
        Line::from(Span::styled(
            format!("{} Loading node data (this can take a while)", SPINNER[frame_index]),
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Polling {} nodes, refreshing every {}",
                state.node_health().len(),
                format_elapsed(app.interval)
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .split(area);

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), chunks[1]);
}
