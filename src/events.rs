use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;
use crate::client::Page;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Refresh combination; consumed here so 'r' never falls through
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.refresh();
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Page switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_page();
            } else {
                app.next_page();
            }
        }
        KeyCode::BackTab => app.prev_page(),
        KeyCode::Char('1') => app.set_page(Page::Dashboard),
        KeyCode::Char('2') => app.set_page(Page::Config),
        KeyCode::Char('3') => app.set_page(Page::Users),
        KeyCode::Char('4') => app.set_page(Page::Logs),

        // Navigation (up/down for rows, left/right for pages)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_page(),
        KeyCode::Right | KeyCode::Char('l') => app.next_page(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('a') => app.open_about(),
        KeyCode::Char('x') | KeyCode::Esc => app.dismiss_newest_notification(),
        KeyCode::Char('u') => app.unbind_selected(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// The tab under `column` in the tab bar.
fn tab_at(column: u16) -> Option<Page> {
    let mut start = 0u16;
    for page in Page::ALL {
        // " N:Label " plus the divider
        let width = page.label().len() as u16 + 5;
        if column < start + width {
            return Some(page);
        }
        start += width;
    }
    None
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Tab bar sits right under the header
            if clicked_row == 1 {
                if let Some(page) = tab_at(mouse.column) {
                    app.set_page(page);
                }
                return;
            }

            // Rows start after the table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                app.select_row(item_row);
            }
        }

        _ => {}
    }
}
