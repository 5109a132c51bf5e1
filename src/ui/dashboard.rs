//! Dashboard page rendering.
//!
//! Headline numbers on top, the recent chat messages on the left and the
//! players currently online on the right. Message text is drawn as plain
//! terminal text, so markup in a message is shown literally.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{page_block, render_not_loaded};
use crate::app::App;
use crate::client::refresh::display_value;
use crate::client::Page;

/// Stats shown in the headline row, in order.
const HEADLINE: [(&str, &str); 6] = [
    ("online_players", "Online"),
    ("bound_users", "Bound"),
    ("total_messages", "Messages"),
    ("uptime", "Uptime"),
    ("websocket_status", "WebSocket"),
    ("config_complete", "Config"),
];

/// Render the Dashboard page.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.views.dashboard else {
        render_not_loaded(frame, app, area, Page::Dashboard);
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).split(area);

    // Headline numbers
    let mut spans = Vec::new();
    for (key, label) in HEADLINE {
        let Some(value) = view.stats.get(key) else {
            continue;
        };
        spans.push(Span::raw(format!(" {}: ", label)));
        spans.push(Span::styled(
            display_value(value),
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }
    let stats = Paragraph::new(Line::from(spans)).block(page_block(app, " Overview ".to_string()));
    frame.render_widget(stats, chunks[0]);

    let body = Layout::horizontal([Constraint::Min(30), Constraint::Length(24)]).split(chunks[1]);

    // Recent messages
    let header = Row::new(vec!["Time", "Direction", "Sender", "Message"])
        .height(1)
        .style(app.theme.header);
    let rows: Vec<Row> = view
        .recent_messages
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(m.time.clone()),
                Cell::from(m.direction.clone().unwrap_or_default())
                    .style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(m.sender.clone()).style(Style::default().fg(app.theme.info)),
                Cell::from(m.content.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(page_block(
        app,
        format!(" Recent messages ({}) ", view.recent_messages.len()),
    ))
    .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !view.recent_messages.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, body[0], &mut state);

    // Online players
    let items: Vec<ListItem> = if view.online_players.is_empty() {
        vec![ListItem::new(Span::styled(
            "nobody online",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        view.online_players
            .iter()
            .map(|p| ListItem::new(Span::styled(p.clone(), Style::default().fg(app.theme.healthy))))
            .collect()
    };
    let list = List::new(items).block(page_block(
        app,
        format!(" Online ({}) ", view.online_players.len()),
    ));
    frame.render_widget(list, body[1]);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::refresh::parse_page;
    use crate::client::Page;
    use crate::ui::testing::{app, draw};

    #[test]
    fn test_markup_is_shown_literally() {
        let mut app = app();
        let data = parse_page(
            Page::Dashboard,
            &json!({
                "stats": { "online_players": 1, "uptime": "5m" },
                "recent_messages": [
                    { "sender": "Steve", "content": "<script>x</script>", "time": "10:00:00" }
                ],
                "online_players_list": ["Steve"],
            }),
        )
        .unwrap();
        app.views.apply(data);

        let text = draw(&app, 120, 30);
        assert!(text.contains("<script>x</script>"));
        assert!(text.contains("Online: 1"));
        assert!(text.contains("Online (1)"));
    }

    #[test]
    fn test_escape_sequences_never_reach_the_screen() {
        let hostile = "A\x1b]0;pwned\x07\x1b[2JB";
        let mut app = app();
        let data = parse_page(
            Page::Dashboard,
            &json!({
                "stats": { "uptime": hostile },
                "recent_messages": [
                    { "sender": hostile, "content": hostile, "time": "10:00:00", "direction": hostile }
                ],
                "online_players_list": [hostile],
            }),
        )
        .unwrap();
        app.views.apply(data);
        app.notifications.error(hostile);

        let text = draw(&app, 160, 30);
        assert!(!text.chars().any(|c| c.is_control() && c != '\n'));
        assert!(text.contains("A]0;pwned[2JB"));
    }

    #[test]
    fn test_not_loaded_placeholder() {
        let app = app();
        assert!(draw(&app, 100, 20).contains("No data yet"));
    }
}
