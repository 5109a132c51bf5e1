//! Uniform JSON calls against the dashboard API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, WebUiError};

/// Per-call options. Headers given here win over the defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn post(body: Option<Value>) -> Self {
        Self {
            method: Method::POST,
            body,
            ..Default::default()
        }
    }
}

/// Merge caller headers over the default header set.
pub fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in overrides {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

/// Something that can perform an API call and hand back the parsed body.
///
/// The client talks to the server only through this trait so tests can
/// substitute a recording fake.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn call(&self, endpoint: &str, options: RequestOptions) -> Result<Value>;

    async fn get(&self, endpoint: &str) -> Result<Value> {
        self.call(endpoint, RequestOptions::default()).await
    }

    async fn post(&self, endpoint: &str, body: Option<Value>) -> Result<Value> {
        self.call(endpoint, RequestOptions::post(body)).await
    }
}

/// HTTP implementation of [`ApiTransport`].
///
/// No retries, no caching, and no timeout beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WebUiError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|e| WebUiError::Http(format!("invalid endpoint {}: {}", endpoint, e)))
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    async fn call(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let url = self.url(endpoint)?;
        debug!(method = %options.method, %url, "API call");

        let mut request = self
            .http
            .request(options.method, url)
            .headers(merge_headers(&options.headers));
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebUiError::Request {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap as AxumHeaders, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    async fn spawn_server() -> String {
        let app = Router::new()
            .route(
                "/api/echo",
                get(|headers: AxumHeaders| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    Json(json!({ "content_type": content_type }))
                }),
            )
            .route(
                "/api/body",
                post(|Json(body): Json<Value>| async move { Json(json!({ "got": body })) }),
            )
            .route(
                "/api/broken",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let mut overrides = HeaderMap::new();
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        overrides.insert("x-extra", HeaderValue::from_static("1"));

        let merged = merge_headers(&overrides);
        assert_eq!(merged[CONTENT_TYPE], "text/plain");
        assert_eq!(merged["x-extra"], "1");

        let defaults = merge_headers(&HeaderMap::new());
        assert_eq!(defaults[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(WebUiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_call_sends_default_content_type() {
        let client = ApiClient::new(&spawn_server().await).unwrap();
        let body = client.get("/api/echo").await.unwrap();
        assert_eq!(body["content_type"], "application/json");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let client = ApiClient::new(&spawn_server().await).unwrap();
        let body = client
            .post("/api/body", Some(json!({ "reason": "spam" })))
            .await
            .unwrap();
        assert_eq!(body["got"]["reason"], "spam");
    }

    #[tokio::test]
    async fn test_non_success_status_is_request_error() {
        let client = ApiClient::new(&spawn_server().await).unwrap();
        let err = client.get("/api/broken").await.unwrap_err();
        match err {
            WebUiError::Request {
                status,
                status_text,
            } => {
                assert_eq!(status, 503);
                assert_eq!(status_text, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.get("/api/status").await.unwrap_err();
        assert!(matches!(err, WebUiError::Connection(_) | WebUiError::Http(_)));
    }
}
