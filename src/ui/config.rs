//! Config page rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use super::common::{key_value_widths, page_block, render_not_loaded};
use crate::app::App;
use crate::client::Page;

/// Render the Config page as a read-only option table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.views.config else {
        render_not_loaded(frame, app, area, Page::Config);
        return;
    };

    let header = Row::new(vec!["Option", "Value"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = view
        .entries
        .iter()
        .map(|(name, value)| {
            // Nested dashboard settings are dimmed to set them apart
            let name_style = if name.contains('.') {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(name.clone()).style(name_style),
                Cell::from(value.clone()),
            ])
        })
        .collect();

    let table = Table::new(rows, key_value_widths())
        .header(header)
        .block(page_block(
            app,
            format!(" Configuration ({} options, read-only) ", view.entries.len()),
        ))
        .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !view.entries.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
