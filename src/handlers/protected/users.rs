// handlers/protected/users.rs - /api/users, /api/users/register
//
// The users screen reads these through the `{success, data}` envelope.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    Extension,
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{AdminSession, ApiResult};
use crate::models::RegisterAdmin;
use crate::proxy::{forward, payload, relay_envelope, to_body};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/users - list dashboard admins
pub async fn users_list(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<Value> {
    let request = UpstreamRequest::new(Method::GET, &["admins"]);
    let response = forward(&state, &session, request, "Failed to fetch admins").await?;
    relay_envelope(response, StatusCode::OK)
}

/// POST /api/users/register - create an admin account on behalf of the signed-in admin
pub async fn users_register(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> ApiResult<Value> {
    let admin: RegisterAdmin = payload(&body, RegisterAdmin::REQUIRED, "admin")?;
    tracing::info!("Admin {} registering {}", session.admin_id, admin.email);

    let request = UpstreamRequest::new(Method::POST, &["admins", "register"]).with_body(to_body(&admin)?);
    let response = forward(&state, &session, request, "Registration failed").await?;
    relay_envelope(response, StatusCode::CREATED)
}
