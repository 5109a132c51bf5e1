// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # qqsync-webui
//!
//! A web dashboard and terminal client for the QQSync chat-bridge plugin.
//!
//! The plugin bridges a QQ group and a game server; it owns every piece of
//! business logic. This crate serves a read-mostly view of its state over
//! HTTP and ships a terminal client that watches a running dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────── serve ──────────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌──────────────┐                   │
//! │  │ bridge  │───▶│  server  │───▶│ HTTP (axum)  │                   │
//! │  │ (state) │    │ (routes) │    │ pages + /api │                   │
//! │  └─────────┘    └────┬─────┘    └──────┬───────┘                   │
//! │                      │ messages        │                           │
//! └──────────────────────┼─────────────────┼───────────────────────────┘
//!                        ▼                 │
//!                  daily msg logs          │ JSON
//! ┌─────────────────────────────── watch ──┼───────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌──────▼───┐    ┌─────────┐        │
//! │  │ events  │───▶│   app    │◀───│  client  │    │   ui    │        │
//! │  │ (keys)  │    │ (state)  │───▶│ (tasks)  │    │(ratatui)│        │
//! │  └─────────┘    └────┬─────┘    └──────────┘    └────▲────┘        │
//! │                      └───────────────────────────────┘             │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`bridge`]**: the [`Bridge`] trait over the plugin's published state,
//!   with a file-backed and an in-memory implementation
//! - **[`server`]**: axum router with the HTML pages and JSON endpoints
//! - **[`messages`]**: daily plain-text chat message logs and their statistics
//! - **[`client`]**: API transport, status polling, page refresh, notifications
//! - **[`app`]**: the client's single application state and orchestration
//! - **[`ui`]**: terminal rendering of the client view model
//!
//! ## Usage
//!
//! ### Serving the dashboard
//!
//! ```no_run
//! use std::sync::Arc;
//! use qqsync_webui::{server, FileBridge, MessageLog, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let bridge = Arc::new(FileBridge::new(&settings.bridge.state_file));
//! let messages = MessageLog::new(&settings.bridge.message_dir);
//! let state = Arc::new(server::AppState::new(bridge, messages, settings.clone()));
//! server::serve(state, &settings.server.bind_addr()).await.unwrap();
//! # });
//! ```
//!
//! ### Embedding with an in-memory bridge
//!
//! ```
//! use std::sync::Arc;
//! use qqsync_webui::{server, Bridge, BridgeState, MemoryBridge, MessageLog, Settings};
//!
//! let bridge = Arc::new(MemoryBridge::new(BridgeState::default()));
//! assert!(bridge.users().unwrap().is_empty());
//!
//! let state = server::AppState::new(bridge, MessageLog::new("msg"), Settings::default());
//! let router = server::router(Arc::new(state));
//! ```
//!
//! ### Talking to a running dashboard
//!
//! ```no_run
//! use qqsync_webui::client::{status::check_server_status, ApiClient};
//!
//! # tokio_test::block_on(async {
//! let api = ApiClient::new("http://127.0.0.1:8080").unwrap();
//! let snapshot = check_server_status(&api).await.unwrap();
//! println!("{:?}", snapshot.get("plugin_enabled"));
//! # });
//! ```

pub mod app;
pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod html;
pub mod messages;
pub mod server;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, AppContext, ClientEvent};
pub use bridge::{Bridge, BridgeState, FileBridge, MemoryBridge, UserInfo};
pub use config::Settings;
pub use error::{Result, WebUiError};
pub use messages::{ChatMessage, Direction, MessageLog};
