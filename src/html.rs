//! Server-rendered HTML shells.
//!
//! Pages are deliberately thin: they carry the navigation, the status
//! indicator slots and empty regions that the JSON endpoints fill in. Only
//! the dashboard renders data server-side (the recent messages list).

use std::fmt::Write;

use crate::messages::ChatMessage;

/// Escape text for insertion into element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const NAV: [(&str, &str); 4] = [
    ("/", "Dashboard"),
    ("/config", "Config"),
    ("/users", "Users"),
    ("/logs", "Logs"),
];

const STATUS_KEYS: [(&str, &str); 5] = [
    ("plugin_enabled", "Plugin"),
    ("websocket_connected", "WebSocket"),
    ("bot_online", "Bot"),
    ("online_players", "Players online"),
    ("bound_users", "Bound users"),
];

fn layout(title: &str, active: &str, body: &str) -> String {
    let mut nav = String::new();
    for (href, label) in NAV {
        let class = if href == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{}>{}</a>", href, class, label);
    }

    let mut status = String::new();
    for (key, label) in STATUS_KEYS {
        let _ = write!(
            status,
            "<span class=\"status\" data-status=\"{}\">{}: <b>-</b></span>",
            key, label
        );
    }

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title} - QQSync WebUI</title></head>\n\
         <body>\n\
         <nav>{nav}</nav>\n\
         <header id=\"status-bar\">{status}</header>\n\
         <main id=\"page\" data-page=\"{active}\">\n{body}\n</main>\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        nav = nav,
        status = status,
        active = escape(active),
        body = body,
    )
}

/// Render the recent messages list.
pub fn message_list(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "<ul id=\"recent-messages\"><li class=\"empty\">No messages yet</li></ul>"
            .to_string();
    }
    let mut out = String::from("<ul id=\"recent-messages\">");
    for message in messages {
        let _ = write!(
            out,
            "<li class=\"message {dir}\"><span class=\"time\">{time}</span> \
             <span class=\"sender\">{sender}</span> \
             <span class=\"content\">{content}</span></li>",
            dir = message.direction.as_str(),
            time = escape(&message.time_label()),
            sender = escape(&message.sender),
            content = escape(&message.content),
        );
    }
    out.push_str("</ul>");
    out
}

/// Summary numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub plugin_enabled: bool,
    pub websocket_connected: bool,
    pub online_players: usize,
    pub bound_users: usize,
    pub error: Option<String>,
}

pub fn dashboard_page(summary: &DashboardSummary, messages: &[ChatMessage]) -> String {
    let yes_no = |b: bool| if b { "Running" } else { "Stopped" };
    let mut body = String::new();
    if let Some(error) = &summary.error {
        let _ = writeln!(body, "<div class=\"alert error\">{}</div>", escape(error));
    }
    let _ = write!(
        body,
        "<section id=\"stats\">\
         <div data-stat=\"plugin_status\">{}</div>\
         <div data-stat=\"websocket_status\">{}</div>\
         <div data-stat=\"online_players\">{}</div>\
         <div data-stat=\"bound_users\">{}</div>\
         </section>\n<section><h2>Recent messages</h2>{}</section>",
        yes_no(summary.plugin_enabled),
        if summary.websocket_connected {
            "connected"
        } else {
            "disconnected"
        },
        summary.online_players,
        summary.bound_users,
        message_list(messages),
    );
    layout("Dashboard", "/", &body)
}

pub fn config_page() -> String {
    layout(
        "Config",
        "/config",
        "<table id=\"config-table\"><thead><tr><th>Option</th><th>Value</th></tr></thead><tbody></tbody></table>",
    )
}

pub fn users_page() -> String {
    layout(
        "Users",
        "/users",
        "<table id=\"users-table\"><thead><tr><th>Player</th><th>QQ</th><th>Status</th><th>Online</th></tr></thead><tbody></tbody></table>",
    )
}

pub fn logs_page() -> String {
    layout(
        "Logs",
        "/logs",
        "<table id=\"logs-table\"><thead><tr><th>Time</th><th>Action</th><th>Operator</th><th>Target</th></tr></thead><tbody></tbody></table>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Direction;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<script>x</script>"), "&lt;script&gt;x&lt;/script&gt;");
        assert_eq!(escape("a & \"b\" 'c'"), "a &amp; &quot;b&quot; &#39;c&#39;");
        assert_eq!(escape("plain 文本"), "plain 文本");
    }

    #[test]
    fn test_message_list_escapes_user_text() {
        let messages = vec![ChatMessage {
            timestamp: 0,
            sender: "<b>Steve</b>".to_string(),
            content: "<script>x</script>".to_string(),
            direction: Direction::QqToGame,
            message_type: "chat".to_string(),
        }];
        let html = message_list(&messages);
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt;Steve&lt;/b&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("class=\"message qq_to_game\""));
    }

    #[test]
    fn test_layout_marks_active_page() {
        let html = users_page();
        assert!(html.contains("<a href=\"/users\" class=\"active\">Users</a>"));
        assert!(html.contains("data-status=\"bot_online\""));
        assert!(html.contains("id=\"users-table\""));
    }

    #[test]
    fn test_dashboard_shows_error_and_empty_list() {
        let summary = DashboardSummary {
            error: Some("plugin <missing>".to_string()),
            ..Default::default()
        };
        let html = dashboard_page(&summary, &[]);
        assert!(html.contains("plugin &lt;missing&gt;"));
        assert!(html.contains("No messages yet"));
    }
}
