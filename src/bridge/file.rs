//! File-based bridge.
//!
//! Reads the state document the plugin writes and queues commands in a
//! JSON-lines file next to it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Bridge, BridgeCommand, BridgeState};
use crate::error::{Result, WebUiError};

/// A bridge that polls a JSON state file written by the plugin.
///
/// The file's modification time is tracked and the document is only
/// re-parsed after it changes. If a newer document fails to parse, the
/// last good snapshot keeps being served and the error is retained. If
/// the file disappears, the snapshot is dropped and the bridge is
/// unavailable until it comes back.
#[derive(Debug)]
pub struct FileBridge {
    path: PathBuf,
    command_path: PathBuf,
    description: String,
    cache: Mutex<Cache>,
}

#[derive(Debug, Default)]
struct Cache {
    last_modified: Option<SystemTime>,
    snapshot: Option<BridgeState>,
    last_error: Option<String>,
}

/// One queued command line.
#[derive(Serialize)]
struct QueuedCommand<'a> {
    issued_at: i64,
    #[serde(flatten)]
    command: &'a BridgeCommand,
}

impl FileBridge {
    /// Create a bridge for the state file at `path`.
    ///
    /// Commands go to `<path without extension>.commands.jsonl`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let command_path = path.with_extension("commands.jsonl");
        let description = format!("file: {}", path.display());
        Self {
            path,
            command_path,
            description,
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn command_path(&self) -> &Path {
        &self.command_path
    }

    /// Error from the most recent read, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.cache.lock().last_error.clone()
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> std::result::Result<BridgeState, String> {
        let content = fs::read_to_string(&self.path).map_err(|e| format!("Read error: {}", e))?;
        serde_json::from_str(&content).map_err(|e| format!("Parse error: {}", e))
    }
}

impl Bridge for FileBridge {
    fn snapshot(&self) -> Result<BridgeState> {
        let current_modified = self.modified_time();
        let mut cache = self.cache.lock();

        let file_changed = match (&cache.last_modified, &current_modified) {
            (Some(last), Some(current)) => current > last,
            _ => true,
        };

        if file_changed {
            match self.read_file() {
                Ok(state) => {
                    debug!(path = %self.path.display(), players = state.bindings.len(), "Loaded plugin state");
                    cache.last_modified = current_modified;
                    cache.snapshot = Some(state);
                    cache.last_error = None;
                }
                Err(e) => {
                    if cache.last_error.as_deref() != Some(e.as_str()) {
                        warn!(path = %self.path.display(), error = %e, "Failed to read plugin state");
                    }
                    if current_modified.is_none() {
                        cache.last_modified = None;
                        cache.snapshot = None;
                    }
                    cache.last_error = Some(e);
                }
            }
        }

        match (&cache.snapshot, &cache.last_error) {
            (Some(state), _) => Ok(state.clone()),
            (None, Some(err)) => Err(WebUiError::Bridge(err.clone())),
            (None, None) => Err(WebUiError::Bridge("no state published yet".to_string())),
        }
    }

    fn execute(&self, command: BridgeCommand) -> Result<()> {
        let line = serde_json::to_string(&QueuedCommand {
            issued_at: chrono::Utc::now().timestamp(),
            command: &command,
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.command_path)?;
        writeln!(file, "{}", line)?;

        info!(subject = command.target(), queue = %self.command_path.display(), "Queued plugin command");
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
