//! Access to the QQSync plugin's runtime state.
//!
//! The plugin owns every piece of business logic (binding, bans, message
//! relay). The dashboard only reads the state it publishes and forwards the
//! few control actions the UI offers.
//!
//! ```text
//! ┌──────────────┐  state file   ┌────────────┐   Bridge   ┌──────────┐
//! │ QQSync plugin│──────────────▶│ FileBridge │───────────▶│  server  │
//! │              │◀──────────────│            │            │          │
//! └──────────────┘ command queue └────────────┘            └──────────┘
//! ```

mod file;
mod memory;
mod state;

pub use file::FileBridge;
pub use memory::MemoryBridge;
pub use state::{
    AuditEntry, AuditQuery, BindingRecord, BindingStatus, BridgeState, ConnectionStatus,
    PluginInfo, ServerInfo, Statistics, UserInfo, UserStats,
};

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebUiError};

/// A control action forwarded to the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BridgeCommand {
    Unbind {
        player: String,
        operator: String,
    },
    Ban {
        player: String,
        reason: String,
        operator: String,
    },
    Unban {
        player: String,
        operator: String,
    },
    /// Drop and re-open the plugin's OneBot WebSocket connection.
    RestartWebsocket {
        operator: String,
    },
}

/// Audit target recorded for connection commands.
pub const WEBSOCKET_TARGET: &str = "websocket";

impl BridgeCommand {
    /// The player the command acts on, if any.
    pub fn player(&self) -> Option<&str> {
        match self {
            BridgeCommand::Unbind { player, .. }
            | BridgeCommand::Ban { player, .. }
            | BridgeCommand::Unban { player, .. } => Some(player),
            BridgeCommand::RestartWebsocket { .. } => None,
        }
    }

    /// What the audit log names as the command's target.
    pub fn target(&self) -> &str {
        self.player().unwrap_or(WEBSOCKET_TARGET)
    }
}

/// Trait for reading the collaborator plugin's state.
///
/// Implementations only need to produce a snapshot and deliver commands;
/// the user-facing queries are provided on top of those two.
pub trait Bridge: Send + Sync + Debug {
    /// The latest known state, or [`WebUiError::Bridge`] if the plugin
    /// cannot be reached.
    fn snapshot(&self) -> Result<BridgeState>;

    /// Hand a control action to the plugin.
    fn execute(&self, command: BridgeCommand) -> Result<()>;

    /// Human-readable description of where the state comes from.
    fn description(&self) -> &str;

    /// The plugin is reachable and reports itself enabled.
    fn is_available(&self) -> bool {
        self.snapshot().map(|s| s.plugin.enabled).unwrap_or(false)
    }

    /// Snapshot of an available plugin; a disabled plugin counts as unavailable.
    fn available_snapshot(&self) -> Result<BridgeState> {
        let state = self.snapshot()?;
        if !state.plugin.enabled {
            return Err(WebUiError::Bridge("plugin is disabled".to_string()));
        }
        Ok(state)
    }

    fn plugin_info(&self) -> Result<PluginInfo> {
        Ok(self.snapshot()?.plugin)
    }

    fn connection_status(&self) -> Result<ConnectionStatus> {
        Ok(self.available_snapshot()?.connection)
    }

    fn server_info(&self) -> Result<ServerInfo> {
        Ok(self.available_snapshot()?.server)
    }

    /// The plugin's raw configuration map.
    fn config(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        Ok(self.available_snapshot()?.config)
    }

    fn statistics(&self) -> Result<Statistics> {
        Ok(self.available_snapshot()?.statistics())
    }

    fn users(&self) -> Result<Vec<UserInfo>> {
        Ok(self.available_snapshot()?.users())
    }

    fn user(&self, player_name: &str) -> Result<UserInfo> {
        self.available_snapshot()?
            .user(player_name)
            .ok_or_else(|| WebUiError::NotFound(format!("player {}", player_name)))
    }

    /// Binding and activity figures for one player.
    fn user_stats(&self, player_name: &str) -> Result<UserStats> {
        self.available_snapshot()?
            .user_stats(player_name, chrono::Utc::now().timestamp())
            .ok_or_else(|| WebUiError::NotFound(format!("player {}", player_name)))
    }

    /// Ask the plugin to reconnect its WebSocket client.
    fn restart_websocket(&self, operator: &str) -> Result<()> {
        self.available_snapshot()?;
        self.execute(BridgeCommand::RestartWebsocket {
            operator: operator.to_string(),
        })
    }

    /// Ask the plugin to unbind a player's QQ account.
    ///
    /// Returns `Ok(false)` if the player has no active binding.
    fn unbind(&self, player_name: &str, operator: &str) -> Result<bool> {
        let user = self.user(player_name)?;
        if !user.is_bound {
            return Ok(false);
        }
        self.execute(BridgeCommand::Unbind {
            player: player_name.to_string(),
            operator: operator.to_string(),
        })?;
        Ok(true)
    }

    /// Returns `Ok(false)` if the player is already banned.
    fn ban(&self, player_name: &str, reason: &str, operator: &str) -> Result<bool> {
        let user = self.user(player_name)?;
        if user.is_banned {
            return Ok(false);
        }
        self.execute(BridgeCommand::Ban {
            player: player_name.to_string(),
            reason: reason.to_string(),
            operator: operator.to_string(),
        })?;
        Ok(true)
    }

    /// Returns `Ok(false)` if the player is not banned.
    fn unban(&self, player_name: &str, operator: &str) -> Result<bool> {
        let user = self.user(player_name)?;
        if !user.is_banned {
            return Ok(false);
        }
        self.execute(BridgeCommand::Unban {
            player: player_name.to_string(),
            operator: operator.to_string(),
        })?;
        Ok(true)
    }

    fn audit_logs(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
        let state = self.available_snapshot()?;
        Ok(query.apply(&state.audit_log, chrono::Utc::now().timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> MemoryBridge {
        let mut state = BridgeState::default();
        state.bindings.insert(
            "Steve".to_string(),
            BindingRecord {
                qq: "10001".to_string(),
                ..Default::default()
            },
        );
        state.bindings.insert("Alex".to_string(), BindingRecord::default());
        MemoryBridge::new(state)
    }

    #[test]
    fn test_unbind_requires_existing_player() {
        let bridge = bridge();
        let err = bridge.unbind("Herobrine", "WebUI").unwrap_err();
        assert!(matches!(err, WebUiError::NotFound(_)));
    }

    #[test]
    fn test_unbind_unbound_player_is_refused() {
        let bridge = bridge();
        assert!(!bridge.unbind("Alex", "WebUI").unwrap());
        assert!(bridge.commands().is_empty());
    }

    #[test]
    fn test_unbind_forwards_command() {
        let bridge = bridge();
        assert!(bridge.unbind("Steve", "WebUI").unwrap());
        assert_eq!(
            bridge.commands(),
            vec![BridgeCommand::Unbind {
                player: "Steve".to_string(),
                operator: "WebUI".to_string(),
            }]
        );
    }

    #[test]
    fn test_ban_then_unban() {
        let bridge = bridge();
        assert!(bridge.ban("Alex", "griefing", "WebUI").unwrap());
        assert!(!bridge.ban("Alex", "again", "WebUI").unwrap());
        assert!(bridge.unban("Alex", "WebUI").unwrap());
        assert!(!bridge.unban("Alex", "WebUI").unwrap());
    }

    #[test]
    fn test_disabled_plugin_is_unavailable() {
        let mut state = BridgeState::default();
        state.plugin.enabled = false;
        let bridge = MemoryBridge::new(state);

        assert!(!bridge.is_available());
        assert!(matches!(bridge.users(), Err(WebUiError::Bridge(_))));
    }

    #[test]
    fn test_restart_websocket_needs_available_plugin() {
        let bridge = bridge();
        bridge.restart_websocket("WebUI").unwrap();
        assert_eq!(
            bridge.commands(),
            vec![BridgeCommand::RestartWebsocket {
                operator: "WebUI".to_string(),
            }]
        );

        bridge.update(|s| s.plugin.enabled = false);
        assert!(matches!(
            bridge.restart_websocket("WebUI"),
            Err(WebUiError::Bridge(_))
        ));
        assert_eq!(bridge.commands().len(), 1);
    }

    #[test]
    fn test_user_stats_unknown_player() {
        let err = bridge().user_stats("Herobrine").unwrap_err();
        assert!(matches!(err, WebUiError::NotFound(_)));
    }

    #[test]
    fn test_command_targets() {
        let restart = BridgeCommand::RestartWebsocket {
            operator: "WebUI".to_string(),
        };
        assert_eq!(restart.player(), None);
        assert_eq!(restart.target(), WEBSOCKET_TARGET);
        assert_eq!(
            serde_json::to_value(&restart).unwrap()["action"],
            "restart_websocket"
        );
    }

    #[test]
    fn test_command_serializes_with_action_tag() {
        let json = serde_json::to_value(BridgeCommand::Ban {
            player: "Alex".to_string(),
            reason: "spam".to_string(),
            operator: "WebUI".to_string(),
        })
        .unwrap();
        assert_eq!(json["action"], "ban");
        assert_eq!(json["player"], "Alex");
    }
}
