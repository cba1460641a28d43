#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::Path,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tower::ServiceExt;

use coach_admin::config::AppConfig;
use coach_admin::models::Admin;
use coach_admin::state::AppState;
use coach_admin::upstream::{Upstream, UpstreamError, UpstreamRequest, UpstreamResponse};

pub const BACKEND_TOKEN: &str = "backend-token";

enum Canned {
    Respond(UpstreamResponse),
    Fail(UpstreamError),
    Panic,
}

/// In-memory backend: records every request and answers from a queue.
/// An empty queue answers 200 `{}`.
#[derive(Default)]
pub struct RecordingUpstream {
    requests: Mutex<Vec<UpstreamRequest>>,
    queue: Mutex<VecDeque<Canned>>,
}

impl RecordingUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.respond_raw(status, Bytes::from(body.to_string()));
    }

    pub fn respond_raw(&self, status: u16, body: impl Into<Bytes>) {
        let response = UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
        };
        self.queue.lock().unwrap().push_back(Canned::Respond(response));
    }

    pub fn fail(&self, err: UpstreamError) {
        self.queue.lock().unwrap().push_back(Canned::Fail(err));
    }

    pub fn panic_next(&self) {
        self.queue.lock().unwrap().push_back(Canned::Panic);
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> UpstreamRequest {
        self.calls().pop().expect("no backend call recorded")
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.requests.lock().unwrap().push(request);
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(Canned::Respond(response)) => Ok(response),
            Some(Canned::Fail(err)) => Err(err),
            Some(Canned::Panic) => panic!("backend stub asked to panic"),
            None => Ok(UpstreamResponse {
                status: StatusCode::OK,
                body: Bytes::from_static(b"{}"),
            }),
        }
    }

    fn describe(&self) -> String {
        "recording://backend".to_string()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config
}

pub fn test_state(upstream: Arc<RecordingUpstream>) -> AppState {
    AppState::with_upstream(test_config(), upstream)
}

pub fn test_admin() -> Admin {
    serde_json::from_value(json!({
        "id": 1,
        "name": "Jone Doe",
        "email": "info@example.com",
        "role": "admin"
    }))
    .unwrap()
}

/// `Cookie` header value for a freshly issued session.
pub fn session_cookie(state: &AppState) -> String {
    let (token, _) = state.sessions.issue(&test_admin(), BACKEND_TOKEN.to_string()).unwrap();
    format!("{}={}", state.sessions.cookie_name(), token)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| panic!("body is not JSON ({}): {:?}", e, self.body))
    }
}

/// Drive one request through the router without a socket.
pub async fn call(state: &AppState, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = coach_admin::app(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse { status, headers, body }
}

// ---------------------------------------------------------------------------
// Socket-level harness: a stub coach API and the proxy served on real ports.
// ---------------------------------------------------------------------------

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn unauthorized() -> axum::response::Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" }))).into_response()
}

async fn stub_login(Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == "info@example.com" && body["password"] == "secret" {
        Json(json!({
            "user": { "_id": "a1", "name": "Jone Doe", "email": "info@example.com", "role": "admin" },
            "token": BACKEND_TOKEN
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Wrong password" }))).into_response()
    }
}

async fn stub_plans(headers: HeaderMap) -> axum::response::Response {
    if bearer(&headers) != Some(BACKEND_TOKEN) {
        return unauthorized();
    }
    Json(json!([
        { "plan_id": 1, "name": "Basic", "price": "19.00", "duration_days": 30, "features": {} },
        { "plan_id": 2, "name": "Pro", "price": 49.5, "duration_days": 30, "features": { "chat": true } }
    ]))
    .into_response()
}

async fn stub_plan_delete(headers: HeaderMap, Path(id): Path<String>) -> axum::response::Response {
    if bearer(&headers) != Some(BACKEND_TOKEN) {
        return unauthorized();
    }
    if id == "404" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Plan not found" }))).into_response();
    }
    Json(json!({ "message": "Plan deleted" })).into_response()
}

async fn stub_slow_stats() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "total": 0 }))
}

async fn stub_admins(headers: HeaderMap) -> axum::response::Response {
    if bearer(&headers) != Some(BACKEND_TOKEN) {
        return unauthorized();
    }
    Json(json!([{ "_id": "a1", "name": "Jone Doe", "email": "info@example.com", "role": "admin" }])).into_response()
}

async fn serve_router(router: Router) -> Result<u16> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(port)
}

/// Stub coach API; returns its `/api` base URL.
pub async fn spawn_backend() -> Result<String> {
    let router = Router::new()
        .route("/api", get(|| async { Json(json!({ "status": "up" })) }))
        .route("/api/admins", get(stub_admins))
        .route("/api/admins/login", post(stub_login))
        .route("/api/plans", get(stub_plans))
        .route("/api/plans/:id", axum::routing::delete(stub_plan_delete))
        .route("/api/subscriptions/stats", get(stub_slow_stats));

    let port = serve_router(router).await?;
    Ok(format!("http://127.0.0.1:{}/api", port))
}

/// Proxy wired to `backend_url` with the real HTTP upstream; returns its base URL.
pub async fn spawn_proxy(backend_url: &str, request_timeout_secs: u64) -> Result<String> {
    let mut config = test_config();
    config.backend.base_url = backend_url.to_string();
    config.backend.request_timeout_secs = request_timeout_secs;
    config.backend.connect_timeout_secs = 1;

    let state = AppState::from_config(config)?;
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(coach_admin::server::serve(listener, state, std::future::pending()));

    Ok(format!("http://127.0.0.1:{}", port))
}
