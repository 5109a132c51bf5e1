//! Terminal UI rendering using ratatui.
//!
//! Rendering is a pure function of the [`App`] view model. Each page is
//! implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`dashboard`]: headline numbers, recent chat messages and online players
//! - [`config`]: flattened plugin and dashboard settings
//! - [`users`]: player bindings, with unbind on the selected row
//! - [`logs`]: administrative audit log
//! - [`common`]: shared components (header, tabs, status bar, help, notifications)
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header with status indicators        │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Page content        ┌──────────────┐ │
//! │                     │ notifications│ │
//! │                     └──────────────┘ │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::client::Page;

pub mod common;
pub mod config;
pub mod dashboard;
pub mod logs;
pub mod theme;
pub mod users;

pub use theme::Theme;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Row where page content starts: header, tabs.
pub const CONTENT_START_ROW: u16 = 2;

/// Draw one full frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
        frame.render_widget(paragraph, centered.intersection(area));
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.page {
        Page::Dashboard => dashboard::render(frame, app, chunks[2]),
        Page::Config => config::render(frame, app, chunks[2]),
        Page::Users => users::render(frame, app, chunks[2]),
        Page::Logs => logs::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);
    common::render_notifications(frame, app, chunks[2]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
