//! Logs page rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};
use serde_json::Value;

use super::common::{page_block, render_not_loaded};
use crate::app::App;
use crate::client::refresh::display_value;
use crate::client::Page;
use crate::format::format_timestamp;

/// One-line summary of an audit entry's details object.
fn details_summary(details: &Value) -> String {
    match details {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, display_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null => String::new(),
        other => display_value(other),
    }
}

/// Render the Logs page, newest entry first.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.views.logs else {
        render_not_loaded(frame, app, area, Page::Logs);
        return;
    };

    let header = Row::new(vec!["Time", "Action", "Operator", "Target", "Details"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = view
        .logs
        .iter()
        .map(|entry| {
            let action_style = if entry.action.contains("ban") {
                Style::default().fg(app.theme.warning)
            } else {
                Style::default().fg(app.theme.info)
            };
            Row::new(vec![
                Cell::from(format_timestamp(Some(entry.timestamp))),
                Cell::from(entry.action.clone()).style(action_style),
                Cell::from(entry.operator.clone()),
                Cell::from(entry.target.clone()),
                Cell::from(details_summary(&entry.details))
                    .style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(page_block(app, format!(" Audit log ({}) ", view.logs.len())))
    .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !view.logs.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
