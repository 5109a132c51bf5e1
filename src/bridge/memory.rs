//! In-memory bridge.
//!
//! Holds a [`BridgeState`] directly. Useful when the dashboard is embedded
//! in the same process as the plugin, and for tests.

use parking_lot::{Mutex, RwLock};
use serde_json::json;

use super::{AuditEntry, Bridge, BridgeCommand, BridgeState};
use crate::error::Result;

/// A bridge whose state is pushed in by the owner.
///
/// Commands are applied to the held state immediately, the way the plugin
/// would apply them, and are also kept for inspection.
#[derive(Debug)]
pub struct MemoryBridge {
    state: RwLock<BridgeState>,
    commands: Mutex<Vec<BridgeCommand>>,
    description: String,
}

impl MemoryBridge {
    pub fn new(state: BridgeState) -> Self {
        Self {
            state: RwLock::new(state),
            commands: Mutex::new(Vec::new()),
            description: "memory".to_string(),
        }
    }

    /// Replace the whole state.
    pub fn set_state(&self, state: BridgeState) {
        *self.state.write() = state;
    }

    /// Mutate the state in place.
    pub fn update(&self, f: impl FnOnce(&mut BridgeState)) {
        f(&mut self.state.write());
    }

    /// Commands executed so far, oldest first.
    pub fn commands(&self) -> Vec<BridgeCommand> {
        self.commands.lock().clone()
    }

    fn apply(state: &mut BridgeState, command: &BridgeCommand, now: i64) {
        let (action, operator, details) = match command {
            BridgeCommand::RestartWebsocket { operator } => {
                // The plugin reconnects on its own; until it does, it is down
                state.connection.websocket_connected = false;
                state.connection.bot_online = false;
                ("restart_websocket", operator, json!({}))
            }
            _ => {
                let Some(record) = command
                    .player()
                    .and_then(|player| state.bindings.get_mut(player))
                else {
                    return;
                };
                match command {
                    BridgeCommand::Unbind { operator, .. } => {
                        record.original_qq = std::mem::take(&mut record.qq);
                        record.unbind_time = Some(now);
                        record.unbind_by = operator.clone();
                        ("unbind", operator, json!({ "original_qq": record.original_qq }))
                    }
                    BridgeCommand::Ban {
                        reason, operator, ..
                    } => {
                        record.is_banned = true;
                        record.ban_time = Some(now);
                        record.ban_by = operator.clone();
                        record.ban_reason = reason.clone();
                        ("ban", operator, json!({ "reason": reason }))
                    }
                    BridgeCommand::Unban { operator, .. } => {
                        record.is_banned = false;
                        record.unban_time = Some(now);
                        record.unban_by = operator.clone();
                        ("unban", operator, json!({}))
                    }
                    BridgeCommand::RestartWebsocket { .. } => return,
                }
            }
        };
        state.audit_log.push(AuditEntry {
            timestamp: now,
            action: action.to_string(),
            operator: operator.clone(),
            target: command.target().to_string(),
            details,
        });
    }
}

impl Bridge for MemoryBridge {
    fn snapshot(&self) -> Result<BridgeState> {
        Ok(self.state.read().clone())
    }

    fn execute(&self, command: BridgeCommand) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        Self::apply(&mut self.state.write(), &command, now);
        self.commands.lock().push(command);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
