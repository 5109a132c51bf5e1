//! HTTP server for the dashboard.
//!
//! Serves the HTML page shells and the JSON API the terminal client (or a
//! browser) polls. All plugin state is read through a [`Bridge`].

mod handlers;
mod pages;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::bridge::Bridge;
use crate::config::Settings;
use crate::error::{Result, WebUiError};
use crate::messages::MessageLog;

/// Name recorded as the operator of actions taken through the dashboard.
pub const OPERATOR: &str = "WebUI";

/// Maximum number of recent messages served to the dashboard.
pub const RECENT_MESSAGE_LIMIT: usize = 50;

/// Everything a request handler needs.
#[derive(Debug)]
pub struct AppState {
    pub bridge: Arc<dyn Bridge>,
    pub messages: MessageLog,
    pub settings: Settings,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(bridge: Arc<dyn Bridge>, messages: MessageLog, settings: Settings) -> Self {
        Self {
            bridge,
            messages,
            settings,
            started_at: Instant::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Run `f` against the message log on the blocking thread pool.
async fn with_messages<T, F>(state: &SharedState, f: F) -> Result<T>
where
    F: FnOnce(&MessageLog) -> T + Send + 'static,
    T: Send + 'static,
{
    let messages = state.messages.clone();
    tokio::task::spawn_blocking(move || f(&messages))
        .await
        .map_err(|e| WebUiError::Io(std::io::Error::other(e)))
}

/// Build the router with all pages, API routes and layers.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/dashboard", get(pages::dashboard))
        .route("/config", get(pages::config))
        .route("/users", get(pages::users))
        .route("/logs", get(pages::logs))
        .route("/robots.txt", get(pages::robots))
        .route("/favicon.ico", get(pages::no_content))
        .route("/api/status", get(handlers::status))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/config", get(handlers::config))
        .route("/api/users", get(handlers::users))
        .route("/api/users/{player_name}", get(handlers::user))
        .route("/api/users/{player_name}/stats", get(handlers::user_stats))
        .route("/api/users/{player_name}/unbind", post(handlers::unbind))
        .route("/api/users/{player_name}/ban", post(handlers::ban))
        .route("/api/users/{player_name}/unban", post(handlers::unban))
        .route("/api/websocket/restart", post(handlers::restart_websocket))
        .route("/api/logs", get(handlers::audit_logs))
        .route("/api/stats", get(handlers::statistics))
        .route("/api/messages", post(handlers::record_message))
        .route("/api/messages/stats", get(handlers::message_stats))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Dashboard server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down dashboard server");
        })
        .await?;

    Ok(())
}

impl IntoResponse for WebUiError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebUiError::NotFound(_) => StatusCode::NOT_FOUND,
            WebUiError::Bridge(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebUiError::Parse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
