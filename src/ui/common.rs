//! Common UI components shared across pages.
//!
//! This module contains the header bar, tab bar, status bar, help overlay
//! and the notification stack.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::client::notify::Phase;
use crate::client::Page;

/// Render the header bar with the server's health indicators.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" ● ", app.theme.indicator_style(app.indicators.overall())),
        Span::styled("QQSYNC ", Style::default().add_modifier(Modifier::BOLD)),
    ];

    for (key, indicator) in app.indicators.iter() {
        spans.push(Span::raw("│ "));
        spans.push(Span::raw(format!("{} ", key.label())));
        spans.push(Span::styled(
            indicator.to_string(),
            app.theme.indicator_style(indicator.state),
        ));
        spans.push(Span::raw(" "));
    }

    if !app.server_label.is_empty() {
        spans.push(Span::styled(
            format!("│ {}", app.server_label),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing the pages.
///
/// Highlights the current page.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| Line::from(format!("{}:{}", i + 1, page.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the page, data age and available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let updated = match app.views.updated_at(app.page) {
        Some(at) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None => "Not loaded (Ctrl+R)".to_string(),
    };

    let controls = match app.page {
        Page::Users => "u:unbind ↑↓:select Ctrl+R:refresh t:theme ?:help q:quit",
        _ => "↑↓:select Tab:switch Ctrl+R:refresh t:theme ?:help q:quit",
    };

    let status = format!(" {} | {} | {}", app.page.label(), updated, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Placeholder shown while a page has no data yet.
pub fn render_not_loaded(frame: &mut Frame, app: &App, area: Rect, page: Page) {
    let block = Block::default()
        .title(format!(" {} ", page.label()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let paragraph = Paragraph::new(" No data yet. Press Ctrl+R to refresh.")
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(block);
    frame.render_widget(paragraph, area);
}

/// A bordered block in the theme's style.
pub fn page_block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Render live notifications stacked in the top-right corner of `area`.
///
/// Entering and leaving notifications are drawn dimmed.
pub fn render_notifications(frame: &mut Frame, app: &App, area: Rect) {
    let width = 44u16.min(area.width.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width + 1);
    let mut y = area.y + 1;

    for notification in app.notifications.iter() {
        if y + 3 > area.y + area.height {
            break;
        }
        let color = app.theme.notification_color(notification.kind);
        let mut style = Style::default().fg(color);
        if notification.phase != Phase::Visible {
            style = style.add_modifier(Modifier::DIM);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(style);
        let line = Line::from(vec![
            Span::styled(
                format!("{} ", notification.kind.icon()),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(notification.message.clone(), style),
        ]);

        let toast = Rect::new(x, y, width, 3);
        frame.render_widget(Clear, toast);
        frame.render_widget(Paragraph::new(line).block(block), toast);
        y += 3;
    }
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current page.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-4         Go to page"),
        Line::from("  Tab ←/→     Switch pages"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Actions"),
        Line::from("  Ctrl+R      Refresh current page"),
        Line::from("  u           Unbind selected player"),
        Line::from("  x/Esc       Dismiss newest notification"),
        Line::from(""),
        section(" General"),
        Line::from("  t           Toggle light/dark theme"),
        Line::from("  a           About (open project page)"),
        Line::from("  q           Quit"),
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

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Column widths for a two-column key/value table.
pub fn key_value_widths() -> [Constraint; 2] {
    [Constraint::Percentage(40), Constraint::Percentage(60)]
}
