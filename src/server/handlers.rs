//! JSON API handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{with_messages, SharedState, OPERATOR, RECENT_MESSAGE_LIMIT};
use crate::bridge::{AuditQuery, BridgeState};
use crate::error::{Result, WebUiError};
use crate::format::format_uptime;
use crate::messages::{ChatMessage, Direction, MAX_STATS_DAYS};

/// Options the plugin understands, with the defaults it assumes.
fn plugin_config_defaults() -> [(&'static str, Value); 12] {
    [
        ("napcat_ws", json!("ws://127.0.0.1:3001")),
        ("access_token", json!("")),
        ("target_group", json!("")),
        ("admins", json!([])),
        ("enable_qq_to_game", json!(true)),
        ("enable_game_to_qq", json!(true)),
        ("force_bind_qq", json!(true)),
        ("sync_group_card", json!(true)),
        ("check_group_member", json!(true)),
        ("chat_count_limit", json!(20)),
        ("chat_ban_time", json!(300)),
        ("api_qq_enable", json!(false)),
    ]
}

fn is_set(config: &Map<String, Value>, key: &str) -> bool {
    match config.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}

fn now_iso() -> String {
    Local::now().to_rfc3339()
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

impl DaysQuery {
    /// The requested range, or `default`, clamped to `1..=MAX_STATS_DAYS`.
    pub fn days_or(&self, default: u32) -> u32 {
        self.days.unwrap_or(default).clamp(1, MAX_STATS_DAYS)
    }
}

/// Message figures the dashboard shows.
struct MessageSummary {
    total_week: usize,
    recent: Vec<ChatMessage>,
}

async fn message_summary(state: &SharedState) -> Result<MessageSummary> {
    with_messages(state, |log| MessageSummary {
        total_week: log.statistics(7).total_messages,
        recent: log.recent(RECENT_MESSAGE_LIMIT),
    })
    .await
}

pub async fn status(State(state): State<SharedState>) -> Json<Value> {
    let body = match state.bridge.available_snapshot() {
        Ok(snapshot) => json!({
            "plugin_enabled": true,
            "websocket_connected": snapshot.connection.websocket_connected,
            "bot_online": snapshot.connection.bot_online,
            "online_players": snapshot.server.online_players.len(),
            "bound_users": snapshot.bound_count(),
            "reconnect_attempts": snapshot.connection.reconnect_attempts,
            "timestamp": now_iso(),
        }),
        Err(e) => json!({
            "plugin_enabled": false,
            "websocket_connected": false,
            "bot_online": false,
            "online_players": 0,
            "bound_users": 0,
            "reconnect_attempts": 0,
            "timestamp": now_iso(),
            "error": e.to_string(),
        }),
    };
    Json(body)
}

fn recent_messages(messages: Vec<ChatMessage>) -> Vec<Value> {
    messages
        .into_iter()
        .map(|m| {
            json!({
                "sender": m.sender,
                "content": m.content,
                "time": m.time_label(),
                "timestamp": m.timestamp,
                "direction": m.direction,
            })
        })
        .collect()
}

fn dashboard_body(state: &SharedState, snapshot: &BridgeState, messages: MessageSummary) -> Value {
    let connection = &snapshot.connection;
    let ws_status = if connection.websocket_connected {
        "connected"
    } else {
        "disconnected"
    };
    let target_group_set = is_set(&snapshot.config, "target_group");
    let napcat_ws_set = is_set(&snapshot.config, "napcat_ws");

    json!({
        "stats": {
            "online_players": snapshot.server.online_players.len(),
            "bound_users": snapshot.bound_count(),
            "total_messages": messages.total_week,
            "uptime": format_uptime(state.started_at.elapsed()),
            "websocket_status": ws_status,
            "config_complete": target_group_set && napcat_ws_set,
        },
        "online_players_list": snapshot.server.online_players,
        "websocket_info": {
            "status": ws_status,
            "last_ping": connection.last_ping,
            "reconnect_attempts": connection.reconnect_attempts,
        },
        "config_status": {
            "target_group_set": target_group_set,
            "napcat_ws_set": napcat_ws_set,
            "websocket_configured": napcat_ws_set,
        },
        "recent_messages": recent_messages(messages.recent),
        "system_info": {
            "webui_version": env!("CARGO_PKG_VERSION"),
            "last_updated": now_iso(),
            "qqsync_plugin_info": snapshot.plugin,
        },
    })
}

pub async fn dashboard(State(state): State<SharedState>) -> Result<Response> {
    let response = match state.bridge.available_snapshot() {
        Ok(snapshot) => {
            let messages = message_summary(&state).await?;
            Json(dashboard_body(&state, &snapshot, messages)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Dashboard requested while plugin unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": e.to_string(),
                    "stats": {
                        "online_players": 0,
                        "bound_users": 0,
                        "total_messages": 0,
                        "uptime": format_uptime(state.started_at.elapsed()),
                        "websocket_status": "disconnected",
                        "config_complete": false,
                    },
                    "recent_messages": [],
                })),
            )
                .into_response()
        }
    };
    Ok(response)
}

pub async fn config(State(state): State<SharedState>) -> Json<Value> {
    let plugin_config = state.bridge.config().unwrap_or_default();

    let mut body = Map::new();
    for (key, default) in plugin_config_defaults() {
        let value = plugin_config.get(key).cloned().unwrap_or(default);
        body.insert(key.to_string(), value);
    }
    body.insert(
        "webui".to_string(),
        serde_json::to_value(&state.settings).unwrap_or(Value::Null),
    );
    Json(Value::Object(body))
}

pub async fn users(State(state): State<SharedState>) -> Result<Json<Value>> {
    let users = state.bridge.users()?;
    Ok(Json(json!({ "users": users })))
}

pub async fn user(
    State(state): State<SharedState>,
    Path(player_name): Path<String>,
) -> Result<Json<Value>> {
    let user = state.bridge.user(&player_name)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn user_stats(
    State(state): State<SharedState>,
    Path(player_name): Path<String>,
) -> Result<Json<Value>> {
    let stats = state.bridge.user_stats(&player_name)?;
    Ok(Json(serde_json::to_value(stats)?))
}

/// Turn the outcome of a control action into a response.
fn action_response(applied: bool, done: String, refused: String) -> Response {
    if applied {
        info!(message = %done, "Control action forwarded");
        Json(json!({ "success": true, "message": done })).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": refused })),
        )
            .into_response()
    }
}

pub async fn unbind(
    State(state): State<SharedState>,
    Path(player_name): Path<String>,
) -> Result<Response> {
    let applied = state.bridge.unbind(&player_name, OPERATOR)?;
    Ok(action_response(
        applied,
        format!("Player {} unbound", player_name),
        format!("Player {} has no QQ binding", player_name),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BanRequest {
    reason: String,
}

pub async fn ban(
    State(state): State<SharedState>,
    Path(player_name): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let request: BanRequest = if body.is_empty() {
        BanRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let applied = state.bridge.ban(&player_name, &request.reason, OPERATOR)?;
    Ok(action_response(
        applied,
        format!("Player {} banned", player_name),
        format!("Player {} is already banned", player_name),
    ))
}

pub async fn unban(
    State(state): State<SharedState>,
    Path(player_name): Path<String>,
) -> Result<Response> {
    let applied = state.bridge.unban(&player_name, OPERATOR)?;
    Ok(action_response(
        applied,
        format!("Player {} unbanned", player_name),
        format!("Player {} is not banned", player_name),
    ))
}

pub async fn restart_websocket(State(state): State<SharedState>) -> Result<Json<Value>> {
    state.bridge.restart_websocket(OPERATOR)?;
    info!("WebSocket restart forwarded");
    Ok(Json(json!({ "success": true, "message": "WebSocket restarting" })))
}

pub async fn audit_logs(
    State(state): State<SharedState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Value>> {
    let logs = state.bridge.audit_logs(&query)?;
    Ok(Json(json!({ "logs": logs, "total": logs.len() })))
}

pub async fn statistics(
    State(state): State<SharedState>,
    Query(query): Query<DaysQuery>,
) -> Response {
    let days = query.days_or(30);
    let stats = state.bridge.statistics().and_then(|stats| {
        let audit = state.bridge.audit_logs(&AuditQuery {
            limit: 1000,
            days,
            ..Default::default()
        })?;
        Ok((stats, audit))
    });

    match stats {
        Ok((stats, audit)) => Json(json!({
            "data_stats": stats,
            "audit_stats": {
                "total_operations": audit.len(),
                "recent_operations": &audit[..audit.len().min(10)],
            },
            "period_days": days,
            "generated_at": now_iso(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": e.to_string(),
                "data_stats": {},
                "audit_stats": {},
                "period_days": days,
            })),
        )
            .into_response(),
    }
}

pub async fn message_stats(
    State(state): State<SharedState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Value>> {
    let days = query.days_or(7);
    let stats = with_messages(&state, move |log| log.statistics(days)).await?;
    Ok(Json(json!({
        "success": true,
        "data": stats,
        "period_days": days,
    })))
}

/// A message relayed by the plugin, to be kept in the log.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    sender: String,
    content: String,
    #[serde(default)]
    direction: Direction,
    #[serde(default, rename = "type")]
    message_type: Option<String>,
    timestamp: Option<i64>,
}

pub async fn record_message(
    State(state): State<SharedState>,
    Json(incoming): Json<IncomingMessage>,
) -> Result<Json<Value>> {
    if incoming.sender.trim().is_empty() {
        return Err(WebUiError::Parse("sender must not be empty".to_string()));
    }
    let mut message = ChatMessage::new(incoming.sender, incoming.content, incoming.direction);
    if let Some(ts) = incoming.timestamp {
        message.timestamp = ts;
    }
    if let Some(kind) = incoming.message_type {
        message.message_type = kind;
    }
    with_messages(&state, move |log| log.append(&message)).await??;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_set() {
        let config: Map<String, Value> = serde_json::from_value(json!({
            "target_group": "123456",
            "napcat_ws": "",
            "admins": [],
            "chat_ban_time": 0,
            "force_bind_qq": true,
        }))
        .unwrap();
        assert!(is_set(&config, "target_group"));
        assert!(!is_set(&config, "napcat_ws"));
        assert!(!is_set(&config, "admins"));
        assert!(!is_set(&config, "chat_ban_time"));
        assert!(is_set(&config, "force_bind_qq"));
        assert!(!is_set(&config, "missing"));
    }

    #[test]
    fn test_days_query_is_clamped() {
        assert_eq!(DaysQuery { days: None }.days_or(7), 7);
        assert_eq!(DaysQuery { days: Some(0) }.days_or(7), 1);
        assert_eq!(DaysQuery { days: Some(u32::MAX) }.days_or(7), MAX_STATS_DAYS);
    }

    #[test]
    fn test_plugin_config_defaults_cover_known_options() {
        let defaults = plugin_config_defaults();
        assert_eq!(defaults.len(), 12);
        assert_eq!(defaults[0], ("napcat_ws", json!("ws://127.0.0.1:3001")));
    }
}
