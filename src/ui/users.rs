//! Users page rendering.
//!
//! One row per player with a binding record. The selected row is the target
//! of the unbind action.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use super::common::{page_block, render_not_loaded};
use crate::app::App;
use crate::bridge::BindingStatus;
use crate::client::Page;
use crate::format::{format_playtime, format_timestamp};

/// Render the Users page.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.views.users else {
        render_not_loaded(frame, app, area, Page::Users);
        return;
    };

    let header = Row::new(vec![
        "Player", "QQ", "Status", "Online", "Playtime", "Sessions", "Last seen", "Banned",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = view
        .users
        .iter()
        .map(|u| {
            let status_style = match u.binding_status {
                BindingStatus::Bound | BindingStatus::Rebound => {
                    Style::default().fg(app.theme.healthy)
                }
                BindingStatus::Unbound => Style::default().fg(app.theme.warning),
                BindingStatus::HistoricallyBound | BindingStatus::NeverBound => {
                    Style::default().add_modifier(Modifier::DIM)
                }
            };
            let (online, online_style) = if u.is_online {
                ("●", Style::default().fg(app.theme.healthy))
            } else {
                ("○", Style::default().add_modifier(Modifier::DIM))
            };
            let banned = if u.is_banned {
                Cell::from("yes").style(
                    Style::default()
                        .fg(app.theme.critical)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Cell::from("-")
            };
            let qq = if u.qq_number.is_empty() {
                "-".to_string()
            } else {
                u.qq_number.clone()
            };

            Row::new(vec![
                Cell::from(u.player_name.clone()),
                Cell::from(qq),
                Cell::from(u.binding_status.label()).style(status_style),
                Cell::from(online).style(online_style),
                Cell::from(format_playtime(u.total_playtime)),
                Cell::from(u.session_count.to_string()),
                Cell::from(format_timestamp(u.last_join_time)),
                banned,
            ])
        })
        .collect();

    let bound = view.users.iter().filter(|u| u.is_bound).count();
    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Length(17),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(20),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(page_block(
        app,
        format!(" Users ({} total, {} bound) ", view.users.len(), bound),
    ))
    .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !view.users.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use crate::bridge::{BindingRecord, UserInfo};
    use crate::client::refresh::{PageData, UsersView};
    use crate::client::Page;
    use crate::ui::testing::{app, draw};

    #[test]
    fn test_user_rows() {
        let mut app = app();
        app.page = Page::Users;

        let record = BindingRecord {
            qq: "12345".to_string(),
            is_banned: true,
            ..Default::default()
        };
        let steve = UserInfo::from_record("Steve", &record, &["Steve".to_string()]);
        let alex = UserInfo::from_record("Alex", &BindingRecord::default(), &[]);
        app.views.apply(PageData::Users(UsersView {
            users: vec![steve, alex],
        }));

        let text = draw(&app, 140, 20);
        assert!(text.contains("Users (2 total, 1 bound)"));
        assert!(text.contains("12345"));
        assert!(text.contains("Never bound"));
    }
}
