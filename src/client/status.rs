//! Server health indicators and the periodic status poll.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::api::ApiTransport;
use super::refresh::{Region, RegionSequencer};
use crate::app::ClientEvent;
use crate::error::{Result, WebUiError};

pub const STATUS_ENDPOINT: &str = "/api/status";

/// Shortest interval the poller will use.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Raw key/value health report from the server.
pub type StatusSnapshot = Map<String, Value>;

/// The indicators the client knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKey {
    PluginEnabled,
    WebsocketConnected,
    BotOnline,
    OnlinePlayers,
    BoundUsers,
}

impl StatusKey {
    pub const ALL: [StatusKey; 5] = [
        StatusKey::PluginEnabled,
        StatusKey::WebsocketConnected,
        StatusKey::BotOnline,
        StatusKey::OnlinePlayers,
        StatusKey::BoundUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKey::PluginEnabled => "plugin_enabled",
            StatusKey::WebsocketConnected => "websocket_connected",
            StatusKey::BotOnline => "bot_online",
            StatusKey::OnlinePlayers => "online_players",
            StatusKey::BoundUsers => "bound_users",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusKey::PluginEnabled => "Plugin",
            StatusKey::WebsocketConnected => "WebSocket",
            StatusKey::BotOnline => "Bot",
            StatusKey::OnlinePlayers => "Online",
            StatusKey::BoundUsers => "Bound",
        }
    }

    /// Counters show their value; flags only show their state.
    pub fn is_counter(&self) -> bool {
        matches!(self, StatusKey::OnlinePlayers | StatusKey::BoundUsers)
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    #[default]
    Unknown,
    Normal,
    Abnormal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Indicator {
    pub state: IndicatorState,
    pub value: Option<Value>,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.state) {
            (Some(Value::Number(n)), _) => write!(f, "{}", n),
            (_, IndicatorState::Normal) => write!(f, "OK"),
            (_, IndicatorState::Abnormal) => write!(f, "DOWN"),
            (_, IndicatorState::Unknown) => write!(f, "-"),
        }
    }
}

/// Current state of every known indicator.
#[derive(Debug, Clone, Default)]
pub struct StatusIndicators {
    indicators: [Indicator; 5],
}

impl StatusIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StatusKey) -> &Indicator {
        &self.indicators[key as usize]
    }

    /// Paint the indicators named in `snapshot`.
    ///
    /// Unknown keys are ignored and indicators whose key is absent keep
    /// their previous state. Returns how many indicators were updated.
    pub fn apply(&mut self, snapshot: &StatusSnapshot) -> usize {
        let mut updated = 0;
        for (key, value) in snapshot {
            let Some(key) = StatusKey::from_key(key) else {
                continue;
            };
            self.indicators[key as usize] = Indicator {
                state: if is_truthy(value) {
                    IndicatorState::Normal
                } else {
                    IndicatorState::Abnormal
                },
                value: Some(value.clone()),
            };
            updated += 1;
        }
        updated
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKey, &Indicator)> {
        StatusKey::ALL.into_iter().zip(self.indicators.iter())
    }

    /// Combined health of the flag indicators.
    ///
    /// Counters are left out: zero players online is not a fault.
    pub fn overall(&self) -> IndicatorState {
        let flags = || {
            self.iter()
                .filter(|(key, _)| !key.is_counter())
                .map(|(_, indicator)| indicator.state)
        };
        if flags().any(|state| state == IndicatorState::Abnormal) {
            IndicatorState::Abnormal
        } else if flags().any(|state| state == IndicatorState::Normal) {
            IndicatorState::Normal
        } else {
            IndicatorState::Unknown
        }
    }
}

/// Fetch one status report.
pub async fn check_server_status(api: &dyn ApiTransport) -> Result<StatusSnapshot> {
    match api.get(STATUS_ENDPOINT).await? {
        Value::Object(map) => Ok(map),
        other => Err(WebUiError::Parse(format!(
            "status payload is not an object: {}",
            other
        ))),
    }
}

/// Poll the status endpoint immediately and then every `interval`, forever.
///
/// Each result is delivered as a [`ClientEvent::Status`]. Failures do not
/// change the schedule. `interval` is raised to [`MIN_POLL_INTERVAL`] if
/// shorter. The task ends when the receiver is dropped.
pub fn spawn_status_poller(
    api: Arc<dyn ApiTransport>,
    sequencer: Arc<RegionSequencer>,
    events: UnboundedSender<ClientEvent>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let seq = sequencer.issue(Region::Status);
            let result = check_server_status(api.as_ref()).await;
            debug!(seq, ok = result.is_ok(), "Status poll finished");
            if events.send(ClientEvent::Status { seq, result }).is_err() {
                break;
            }
        }
    })
}
