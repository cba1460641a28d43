//! Outbound calls to the coach API.
//!
//! Handlers only see the [`Upstream`] trait; [`HttpUpstream`] is the reqwest
//! implementation used by the server binary.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::config::BackendConfig;

/// One request to the backend, relative to its base URL.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path segments below the base URL, unescaped.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `/plans/7` style rendering for logs.
    pub fn display_path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Raw backend answer; status interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Best-effort `message` from an error body. Non-JSON bodies yield `None`.
    pub fn error_message(&self) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("backend request timed out after {0:?}")]
    Timeout(Duration),
    #[error("backend unreachable: {0}")]
    Connect(String),
    #[error("invalid backend path: {0}")]
    InvalidPath(String),
    #[error("backend request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;

    /// Human-readable target, shown by `/health`.
    fn describe(&self) -> String;
}

pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpUpstream {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("backend URL '{}' cannot be used as a base", config.base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout: config.request_timeout(),
        })
    }

    fn url_for(&self, request: &UpstreamRequest) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| UpstreamError::InvalidPath(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in &request.segments {
                if segment.is_empty() || segment == "." || segment == ".." {
                    return Err(UpstreamError::InvalidPath(request.display_path()));
                }
                path.push(segment);
            }
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else if err.is_connect() {
            UpstreamError::Connect(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.url_for(&request)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(UpstreamResponse { status, body })
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn upstream() -> HttpUpstream {
        HttpUpstream::new(&AppConfig::development().backend).unwrap()
    }

    #[test]
    fn builds_url_below_api_prefix() {
        let request = UpstreamRequest::new(Method::GET, &["subscriptions", "expiring-soon"]).with_query("days", "30");
        let url = upstream().url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/subscriptions/expiring-soon?days=30");
    }

    #[test]
    fn escapes_path_ids() {
        let request = UpstreamRequest::new(Method::GET, &["plans", "a/b c"]);
        let url = upstream().url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/plans/a%2Fb%20c");
    }

    #[test]
    fn rejects_dot_segments() {
        let request = UpstreamRequest::new(Method::DELETE, &["plans", ".."]);
        assert!(matches!(upstream().url_for(&request), Err(UpstreamError::InvalidPath(_))));
    }

    #[test]
    fn error_message_tolerates_non_json() {
        let html = UpstreamResponse {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::from_static(b"<html>502</html>"),
        };
        assert_eq!(html.error_message(), None);

        let json = UpstreamResponse {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(br#"{"message":"Plan not found"}"#),
        };
        assert_eq!(json.error_message().as_deref(), Some("Plan not found"));
    }
}
