//! Page-scoped data refresh.
//!
//! Each page owns one region of the view model and is filled from one
//! endpoint. Responses are tagged with a per-region sequence number so a
//! slow, superseded response never overwrites a newer one.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::api::ApiTransport;
use crate::bridge::{AuditEntry, UserInfo};
use crate::error::{Result, WebUiError};
use crate::format::printable;

/// The four pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {
    Dashboard,
    Config,
    Users,
    Logs,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Config, Page::Users, Page::Logs];

    /// Map a page path to its page. `/dashboard` is an alias of `/`.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "/dashboard" => Some(Page::Dashboard),
            "/config" => Some(Page::Config),
            "/users" => Some(Page::Users),
            "/logs" => Some(Page::Logs),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Config => "/config",
            Page::Users => "/users",
            Page::Logs => "/logs",
        }
    }

    /// API endpoint that feeds this page.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Page::Dashboard => "/api/dashboard",
            Page::Config => "/api/config",
            Page::Users => "/api/users",
            Page::Logs => "/api/logs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Config => "Config",
            Page::Users => "Users",
            Page::Logs => "Logs",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// An independently updated part of the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Status,
    Page(Page),
}

/// Hands out increasing sequence numbers per region and remembers the
/// latest one issued.
#[derive(Debug, Default)]
pub struct RegionSequencer {
    latest: Mutex<HashMap<Region, u64>>,
}

impl RegionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, region: Region) -> u64 {
        let mut latest = self.latest.lock();
        let seq = latest.entry(region).or_insert(0);
        *seq += 1;
        *seq
    }

    pub fn latest(&self, region: Region) -> Option<u64> {
        self.latest.lock().get(&region).copied()
    }

    /// Whether `seq` is the newest number issued for `region`.
    pub fn is_current(&self, region: Region, seq: u64) -> bool {
        self.latest(region) == Some(seq)
    }
}

/// Render a JSON scalar the way it should appear on screen.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageView {
    pub sender: String,
    pub content: String,
    pub time: String,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub stats: Map<String, Value>,
    pub recent_messages: Vec<MessageView>,
    pub online_players: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigView {
    /// Dotted option name and display value, in server order.
    pub entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsersView {
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogsView {
    pub logs: Vec<AuditEntry>,
}

/// A fully parsed payload for one page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    Dashboard(DashboardView),
    Config(ConfigView),
    Users(UsersView),
    Logs(LogsView),
}

impl PageData {
    pub fn page(&self) -> Page {
        match self {
            PageData::Dashboard(_) => Page::Dashboard,
            PageData::Config(_) => Page::Config,
            PageData::Users(_) => Page::Users,
            PageData::Logs(_) => Page::Logs,
        }
    }
}

const SECRET_KEYS: [&str; 1] = ["access_token"];

fn flatten_config(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) => flatten_config(&name, inner, out),
            Value::String(s) if SECRET_KEYS.contains(&key.as_str()) && !s.is_empty() => {
                out.push((name, "********".to_string()));
            }
            _ => out.push((name, display_value(value))),
        }
    }
}

fn field<'a, T: Deserialize<'a>>(payload: &'a Value, name: &str) -> Result<T> {
    let value = payload
        .get(name)
        .ok_or_else(|| WebUiError::Parse(format!("missing field `{}`", name)))?;
    T::deserialize(value).map_err(|e| WebUiError::Parse(format!("field `{}`: {}", name, e)))
}

/// Copy of `value` with every string, keys included, made terminal-safe.
fn printable_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(printable(s)),
        Value::Array(items) => Value::Array(items.iter().map(printable_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (printable(k), printable_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse a page payload completely, or not at all.
///
/// Text from the server is stripped of control characters first, so
/// nothing in a view can drive the terminal.
pub fn parse_page(page: Page, payload: &Value) -> Result<PageData> {
    let payload = &printable_value(payload);
    match page {
        Page::Dashboard => {
            let stats: Map<String, Value> = field(payload, "stats")?;
            let recent_messages = match payload.get("recent_messages") {
                Some(_) => field(payload, "recent_messages")?,
                None => Vec::new(),
            };
            let online_players = match payload.get("online_players_list") {
                Some(_) => field(payload, "online_players_list")?,
                None => Vec::new(),
            };
            Ok(PageData::Dashboard(DashboardView {
                stats,
                recent_messages,
                online_players,
            }))
        }
        Page::Config => {
            let map = payload
                .as_object()
                .ok_or_else(|| WebUiError::Parse("config payload is not an object".to_string()))?;
            let mut entries = Vec::new();
            flatten_config("", map, &mut entries);
            Ok(PageData::Config(ConfigView { entries }))
        }
        Page::Users => Ok(PageData::Users(UsersView {
            users: field(payload, "users")?,
        })),
        Page::Logs => Ok(PageData::Logs(LogsView {
            logs: field(payload, "logs")?,
        })),
    }
}

/// Issue the page's single request and parse the result.
pub async fn fetch_page(api: &dyn ApiTransport, page: Page) -> Result<PageData> {
    let payload = api.get(page.endpoint()).await?;
    parse_page(page, &payload)
}

/// Everything the pages display. Each page only ever writes its own slot.
#[derive(Debug, Default)]
pub struct PageViews {
    pub dashboard: Option<DashboardView>,
    pub config: Option<ConfigView>,
    pub users: Option<UsersView>,
    pub logs: Option<LogsView>,
    updated_at: HashMap<Page, Instant>,
}

impl PageViews {
    pub fn apply(&mut self, data: PageData) {
        self.updated_at.insert(data.page(), Instant::now());
        match data {
            PageData::Dashboard(view) => self.dashboard = Some(view),
            PageData::Config(view) => self.config = Some(view),
            PageData::Users(view) => self.users = Some(view),
            PageData::Logs(view) => self.logs = Some(view),
        }
    }

    pub fn updated_at(&self, page: Page) -> Option<Instant> {
        self.updated_at.get(&page).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::RequestOptions;
    use async_trait::async_trait;
    use serde_json::json;

    /// Records every endpoint hit and answers with canned payloads.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ApiTransport for Recorder {
        async fn call(&self, endpoint: &str, _options: RequestOptions) -> Result<Value> {
            self.calls.lock().push(endpoint.to_string());
            Ok(match endpoint {
                "/api/users" => json!({ "users": [] }),
                "/api/dashboard" => json!({ "stats": {} }),
                "/api/logs" => json!({ "logs": [] }),
                _ => json!({}),
            })
        }
    }

    #[test]
    fn test_page_from_path() {
        assert_eq!(Page::from_path("/"), Some(Page::Dashboard));
        assert_eq!(Page::from_path("/dashboard"), Some(Page::Dashboard));
        assert_eq!(Page::from_path("/users"), Some(Page::Users));
        assert_eq!(Page::from_path("/logs"), Some(Page::Logs));
        assert_eq!(Page::from_path("/nowhere"), None);
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
    }

    #[test]
    fn test_page_cycling() {
        assert_eq!(Page::Logs.next(), Page::Dashboard);
        assert_eq!(Page::Dashboard.prev(), Page::Logs);
        assert_eq!(Page::Config.next(), Page::Users);
    }

    #[test]
    fn test_sequencer_only_latest_is_current() {
        let seq = RegionSequencer::new();
        let users = Region::Page(Page::Users);

        let first = seq.issue(users);
        let second = seq.issue(users);
        assert!(!seq.is_current(users, first));
        assert!(seq.is_current(users, second));

        // Regions are independent
        let status = seq.issue(Region::Status);
        assert_eq!(status, 1);
        assert!(seq.is_current(users, second));
        assert!(!seq.is_current(Region::Page(Page::Logs), 1));
    }

    #[test]
    fn test_parse_dashboard() {
        let data = parse_page(
            Page::Dashboard,
            &json!({
                "stats": { "online_players": 2, "uptime": "5m" },
                "recent_messages": [
                    { "sender": "Steve", "content": "<b>hi</b>", "time": "10:00:00", "direction": "qq_to_game" }
                ],
                "online_players_list": ["Steve", "Alex"],
            }),
        )
        .unwrap();
        let PageData::Dashboard(view) = data else {
            panic!("wrong page");
        };
        assert_eq!(display_value(&view.stats["online_players"]), "2");
        assert_eq!(view.recent_messages[0].content, "<b>hi</b>");
        assert_eq!(view.online_players.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed_payload_entirely() {
        let err = parse_page(
            Page::Dashboard,
            &json!({ "stats": {}, "recent_messages": [{ "sender": "x" }] }),
        )
        .unwrap_err();
        assert!(matches!(err, WebUiError::Parse(_)));

        assert!(parse_page(Page::Users, &json!({ "error": "nope" })).is_err());
    }

    #[test]
    fn test_parse_strips_control_characters() {
        let data = parse_page(
            Page::Logs,
            &json!({
                "logs": [{
                    "timestamp": 0,
                    "action": "ban\x1b[2J",
                    "operator": "WebUI",
                    "target": "A\x1b]0;pwned\x07B",
                    "details": { "reason\x07": "line\nbreak" },
                }],
            }),
        )
        .unwrap();
        let PageData::Logs(view) = data else {
            panic!("wrong page");
        };
        assert_eq!(view.logs[0].action, "ban[2J");
        assert_eq!(view.logs[0].target, "A]0;pwnedB");
        assert_eq!(view.logs[0].details, json!({ "reason": "line break" }));
    }

    #[test]
    fn test_parse_config_flattens_and_masks() {
        let data = parse_page(
            Page::Config,
            &json!({
                "access_token": "secret",
                "admins": ["1", "2"],
                "webui": { "server": { "port": 8080 } },
            }),
        )
        .unwrap();
        let PageData::Config(view) = data else {
            panic!("wrong page");
        };
        assert!(view
            .entries
            .contains(&("access_token".to_string(), "********".to_string())));
        assert!(view
            .entries
            .contains(&("admins".to_string(), "1, 2".to_string())));
        assert!(view
            .entries
            .contains(&("webui.server.port".to_string(), "8080".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_page_hits_only_its_endpoint() {
        let api = Recorder::default();
        let data = fetch_page(&api, Page::Users).await.unwrap();
        assert_eq!(data.page(), Page::Users);
        assert_eq!(*api.calls.lock(), vec!["/api/users".to_string()]);
    }

    #[test]
    fn test_page_views_apply_touches_one_region() {
        let mut views = PageViews::default();
        views.apply(PageData::Users(UsersView::default()));
        assert!(views.users.is_some());
        assert!(views.dashboard.is_none());
        assert!(views.config.is_none());
        assert!(views.updated_at(Page::Users).is_some());
        assert!(views.updated_at(Page::Logs).is_none());
    }
}
