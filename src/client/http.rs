//! reqwest client for the proxy routes.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not signed in")]
    Unauthorized,
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    fn from_response(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ClientError::Unauthorized;
        }
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Session cookie as issued by `/api/auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Transport seam for [`AdminHooks`](super::AdminHooks).
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, ClientError>;
    async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError>;
    async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError>;
    async fn delete(&self, path: &str) -> Result<(), ClientError>;
}

pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Option<SessionCookie>>,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        })
    }

    pub fn with_session(self, session: SessionCookie) -> Self {
        self.set_session(Some(session));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Option<SessionCookie> {
        self.session.read().map(|s| s.clone()).unwrap_or_else(|p| p.into_inner().clone())
    }

    fn set_session(&self, session: Option<SessionCookie>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    /// Sign in and keep the returned session cookie for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|raw| cookie::Cookie::parse(raw.to_string()).ok())
            .find(|c| !c.value().is_empty())
            .map(|c| SessionCookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
            });
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_response(status, &body));
        }

        let session = cookie.ok_or_else(|| ClientError::Decode("login answered without a session cookie".into()))?;
        self.set_session(Some(session));

        let envelope: Value = serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(envelope.get("data").cloned().unwrap_or(envelope))
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.send(Method::POST, "/api/auth/logout", None).await;
        self.set_session(None);
        result.map(|_| ())
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<Value>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(session) = self.session() {
            builder = builder.header(header::COOKIE, session.header_value());
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_response(status, &bytes));
        }
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DashboardApi for DashboardClient {
    async fn get(&self, path: &str) -> Result<Value, ClientError> {
        Ok(self.send(Method::GET, path, None).await?.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        Ok(self.send(Method::POST, path, Some(body)).await?.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        Ok(self.send(Method::PUT, path, Some(body)).await?.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}
