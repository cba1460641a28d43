// handlers/protected/plans.rs - /api/subscription/plans[/:id]

use axum::{
    extract::{Path, State},
    http::Method,
    response::Response,
    Extension,
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;

use crate::error::ApiError;
use crate::middleware::AdminSession;
use crate::models::PlanPayload;
use crate::proxy::{forward, payload, relay_created, relay_deleted, relay_json, to_body};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/subscription/plans
pub async fn plans_list(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["plans"]);
    let response = forward(&state, &session, request, "Failed to fetch plans").await?;
    relay_json(response)
}

/// POST /api/subscription/plans
///
/// Requires `name`, `price`, `duration_days` and `features`; `description`
/// is forwarded as `""` when absent.
pub async fn plans_create(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let plan: PlanPayload = payload(&body, PlanPayload::REQUIRED, "plan")?;

    let request = UpstreamRequest::new(Method::POST, &["plans"]).with_body(to_body(&plan)?);
    let response = forward(&state, &session, request, "Failed to create plan").await?;
    relay_created(response)
}

/// GET /api/subscription/plans/:id
pub async fn plan_get(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["plans", id.as_str()]);
    let response = forward(&state, &session, request, "Failed to fetch plan").await?;
    relay_json(response)
}

/// PUT /api/subscription/plans/:id
pub async fn plan_update(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let plan: PlanPayload = payload(&body, PlanPayload::REQUIRED, "plan")?;

    let request = UpstreamRequest::new(Method::PUT, &["plans", id.as_str()]).with_body(to_body(&plan)?);
    let response = forward(&state, &session, request, "Failed to update plan").await?;
    relay_json(response)
}

/// DELETE /api/subscription/plans/:id
pub async fn plan_delete(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::DELETE, &["plans", id.as_str()]);
    let response = forward(&state, &session, request, "Failed to delete plan").await?;
    Ok(relay_deleted(response))
}
