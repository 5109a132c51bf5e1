//! State document published by the QQSync plugin, and the views derived from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the dashboard knows about the collaborator plugin at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeState {
    pub plugin: PluginInfo,
    pub connection: ConnectionStatus,
    pub server: ServerInfo,
    /// Raw plugin configuration, keyed by option name.
    pub config: Map<String, Value>,
    /// Binding records keyed by player name.
    pub bindings: BTreeMap<String, BindingRecord>,
    pub audit_log: Vec<AuditEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub description: String,
}

impl Default for PluginInfo {
    fn default() -> Self {
        Self {
            name: "qqsync_plugin".to_string(),
            version: "unknown".to_string(),
            enabled: true,
            description: "QQSync chat bridge".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStatus {
    pub websocket_connected: bool,
    pub bot_online: bool,
    /// Unix seconds of the last heartbeat, if any.
    pub last_ping: Option<i64>,
    pub reconnect_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub name: String,
    pub max_players: u32,
    pub online_players: Vec<String>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            max_players: 0,
            online_players: Vec::new(),
        }
    }
}

/// One player's binding record as stored by the plugin.
///
/// Times are Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingRecord {
    pub name: Option<String>,
    pub qq: String,
    pub xuid: String,
    pub bind_time: Option<i64>,
    pub unbind_time: Option<i64>,
    pub rebind_time: Option<i64>,
    pub unbind_by: String,
    pub unbind_reason: String,
    pub original_qq: String,
    pub total_playtime: u64,
    pub session_count: u64,
    pub last_join_time: Option<i64>,
    pub last_quit_time: Option<i64>,
    pub is_banned: bool,
    pub ban_time: Option<i64>,
    pub ban_by: String,
    pub ban_reason: String,
    pub unban_time: Option<i64>,
    pub unban_by: String,
}

impl BindingRecord {
    pub fn is_bound(&self) -> bool {
        !self.qq.trim().is_empty()
    }
}

/// Human-facing binding state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStatus {
    Bound,
    Rebound,
    Unbound,
    HistoricallyBound,
    NeverBound,
}

impl BindingStatus {
    pub fn of(record: &BindingRecord) -> Self {
        if record.is_bound() {
            if record.rebind_time.is_some() {
                BindingStatus::Rebound
            } else {
                BindingStatus::Bound
            }
        } else if record.unbind_time.is_some() {
            BindingStatus::Unbound
        } else if !record.original_qq.is_empty() {
            BindingStatus::HistoricallyBound
        } else {
            BindingStatus::NeverBound
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BindingStatus::Bound => "Bound",
            BindingStatus::Rebound => "Rebound",
            BindingStatus::Unbound => "Unbound",
            BindingStatus::HistoricallyBound => "Previously bound",
            BindingStatus::NeverBound => "Never bound",
        }
    }
}

/// A player row as served by `/api/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub player_name: String,
    pub name: String,
    pub qq_number: String,
    pub xuid: String,
    pub is_online: bool,
    pub bind_time: Option<i64>,
    pub unbind_time: Option<i64>,
    pub rebind_time: Option<i64>,
    pub unbind_by: String,
    pub unbind_reason: String,
    pub original_qq: String,
    pub total_playtime: u64,
    pub session_count: u64,
    pub last_join_time: Option<i64>,
    pub last_quit_time: Option<i64>,
    pub is_banned: bool,
    pub ban_time: Option<i64>,
    pub ban_by: String,
    pub ban_reason: String,
    pub unban_time: Option<i64>,
    pub unban_by: String,
    pub is_bound: bool,
    pub binding_status: BindingStatus,
}

impl UserInfo {
    pub fn from_record(player_name: &str, record: &BindingRecord, online: &[String]) -> Self {
        Self {
            player_name: player_name.to_string(),
            name: record.name.clone().unwrap_or_else(|| player_name.to_string()),
            qq_number: record.qq.clone(),
            xuid: record.xuid.clone(),
            is_online: online.iter().any(|p| p == player_name),
            bind_time: record.bind_time,
            unbind_time: record.unbind_time,
            rebind_time: record.rebind_time,
            unbind_by: record.unbind_by.clone(),
            unbind_reason: record.unbind_reason.clone(),
            original_qq: record.original_qq.clone(),
            total_playtime: record.total_playtime,
            session_count: record.session_count,
            last_join_time: record.last_join_time,
            last_quit_time: record.last_quit_time,
            is_banned: record.is_banned,
            ban_time: record.ban_time,
            ban_by: record.ban_by.clone(),
            ban_reason: record.ban_reason.clone(),
            unban_time: record.unban_time,
            unban_by: record.unban_by.clone(),
            is_bound: record.is_bound(),
            binding_status: BindingStatus::of(record),
        }
    }
}

/// Per-player figures served by `/api/users/{name}/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub player_name: String,
    pub qq_number: String,
    pub is_bound: bool,
    pub is_online: bool,
    pub bind_time: Option<i64>,
    /// Seconds since `bind_time`, 0 without one.
    pub bind_duration: u64,
    /// Accumulated playtime in seconds.
    pub online_time: u64,
    pub session_count: u64,
    pub last_login: Option<i64>,
    pub last_logout: Option<i64>,
}

impl UserStats {
    pub fn from_record(player_name: &str, record: &BindingRecord, online: &[String], now: i64) -> Self {
        Self {
            player_name: player_name.to_string(),
            qq_number: record.qq.clone(),
            is_bound: record.is_bound(),
            is_online: online.iter().any(|p| p == player_name),
            bind_time: record.bind_time,
            bind_duration: record
                .bind_time
                .map_or(0, |bound_at| u64::try_from(now.saturating_sub(bound_at)).unwrap_or(0)),
            online_time: record.total_playtime,
            session_count: record.session_count,
            last_login: record.last_join_time,
            last_logout: record.last_quit_time,
        }
    }
}

/// Aggregate numbers over all binding records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_users: usize,
    pub bound_users: usize,
    pub unbound_users: usize,
    pub online_users: usize,
    pub offline_users: usize,
    pub banned_users: usize,
    pub total_playtime: u64,
    pub total_sessions: u64,
    pub average_playtime: f64,
    pub average_sessions: f64,
}

impl BridgeState {
    /// All players with a binding record, in name order.
    pub fn users(&self) -> Vec<UserInfo> {
        self.bindings
            .iter()
            .map(|(name, record)| UserInfo::from_record(name, record, &self.server.online_players))
            .collect()
    }

    pub fn user(&self, player_name: &str) -> Option<UserInfo> {
        self.bindings
            .get(player_name)
            .map(|record| UserInfo::from_record(player_name, record, &self.server.online_players))
    }

    pub fn user_stats(&self, player_name: &str, now: i64) -> Option<UserStats> {
        self.bindings.get(player_name).map(|record| {
            UserStats::from_record(player_name, record, &self.server.online_players, now)
        })
    }

    pub fn statistics(&self) -> Statistics {
        let total_users = self.bindings.len();
        let bound_users = self.bindings.values().filter(|r| r.is_bound()).count();
        let online_users = self
            .bindings
            .keys()
            .filter(|name| self.server.online_players.contains(name))
            .count();
        let banned_users = self.bindings.values().filter(|r| r.is_banned).count();
        let total_playtime: u64 = self.bindings.values().map(|r| r.total_playtime).sum();
        let total_sessions: u64 = self.bindings.values().map(|r| r.session_count).sum();

        let average = |total: u64| {
            if total_users > 0 {
                total as f64 / total_users as f64
            } else {
                0.0
            }
        };

        Statistics {
            total_users,
            bound_users,
            unbound_users: total_users - bound_users,
            online_users,
            offline_users: total_users - online_users,
            banned_users,
            total_playtime,
            total_sessions,
            average_playtime: average(total_playtime),
            average_sessions: average(total_sessions),
        }
    }

    /// Number of players whose binding is currently active.
    pub fn bound_count(&self) -> usize {
        self.bindings.values().filter(|r| r.is_bound()).count()
    }
}

/// An administrative action recorded by the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unix seconds.
    pub timestamp: i64,
    pub action: String,
    pub operator: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub details: Value,
}

/// Filter applied to the audit log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditQuery {
    pub limit: usize,
    pub action_type: Option<String>,
    pub operator: Option<String>,
    pub days: u32,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            action_type: None,
            operator: None,
            days: 30,
        }
    }
}

impl AuditQuery {
    /// Select matching entries, newest first, at most `limit` of them.
    pub fn apply(&self, entries: &[AuditEntry], now: i64) -> Vec<AuditEntry> {
        let cutoff = now - i64::from(self.days) * 86_400;
        let mut selected: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| e.timestamp >= cutoff)
            .filter(|e| match self.action_type.as_deref() {
                Some(action) if !action.is_empty() => e.action == action,
                _ => true,
            })
            .filter(|e| match self.operator.as_deref() {
                Some(operator) if !operator.is_empty() => e.operator == operator,
                _ => true,
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        selected.truncate(self.limit);
        selected
    }
}
