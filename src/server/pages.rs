//! HTML pages and miscellaneous browser requests.

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::warn;

use super::{with_messages, SharedState, RECENT_MESSAGE_LIMIT};
use crate::html::{self, DashboardSummary};

pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let summary = match state.bridge.available_snapshot() {
        Ok(snapshot) => DashboardSummary {
            plugin_enabled: true,
            websocket_connected: snapshot.connection.websocket_connected,
            online_players: snapshot.server.online_players.len(),
            bound_users: snapshot.bound_count(),
            error: None,
        },
        Err(e) => DashboardSummary {
            error: Some(e.to_string()),
            ..Default::default()
        },
    };
    let messages = if summary.error.is_none() {
        with_messages(&state, |log| log.recent(RECENT_MESSAGE_LIMIT))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read recent messages");
                Vec::new()
            })
    } else {
        Vec::new()
    };
    Html(html::dashboard_page(&summary, &messages))
}

pub async fn config() -> Html<String> {
    Html(html::config_page())
}

pub async fn users() -> Html<String> {
    Html(html::users_page())
}

pub async fn logs() -> Html<String> {
    Html(html::logs_page())
}

pub async fn robots() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        "User-agent: *\nDisallow: /",
    )
}

pub async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Unknown API paths get a JSON 404, other page loads go home, and
/// anything else (favicon and similar browser requests) is answered with an empty 204.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    warn!(%method, path, "Not found");

    if path.starts_with("/api/") || path == "/api" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "API endpoint not found",
                "path": path,
            })),
        )
            .into_response();
    }
    if method == Method::GET {
        return (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
