//! Authenticate-then-forward core shared by every proxy handler.
//!
//! The session guard has already run by the time a handler calls into this
//! module, so everything here assumes an [`AdminSession`].

pub mod body;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{AdminSession, ApiResponse};
use crate::state::AppState;
use crate::upstream::{UpstreamRequest, UpstreamResponse};

pub use body::{json_object, payload, require_fields};

/// Send `request` with the session's bearer token. Non-2xx answers become
/// [`ApiError::Upstream`] carrying the backend's message or `failure`.
pub async fn forward(
    state: &AppState,
    session: &AdminSession,
    request: UpstreamRequest,
    failure: &str,
) -> Result<UpstreamResponse, ApiError> {
    let request = request.with_bearer(session.bearer());
    let method = request.method.clone();
    let path = request.display_path();

    let response = state.upstream.send(request).await?;

    if !response.is_success() {
        let message = response.error_message().unwrap_or_else(|| failure.to_string());
        tracing::warn!(
            "{} {} failed for admin {}: backend answered {} ({})",
            method,
            path,
            session.admin_id,
            response.status,
            message
        );
        return Err(ApiError::upstream(message, Some(response.status.as_u16())));
    }

    tracing::info!("{} {} -> {}", method, path, response.status);
    Ok(response)
}

/// Parse the backend body as JSON, failing with a 500 when it is not.
pub fn parse_json(response: &UpstreamResponse) -> Result<Value, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| {
        tracing::warn!("Backend returned a non-JSON success body: {}", e);
        ApiError::upstream("Backend returned an invalid response", Some(response.status.as_u16()))
    })
}

/// Relay the backend body unmodified with `status`.
fn relay_with(response: UpstreamResponse, status: StatusCode) -> Result<Response, ApiError> {
    if response.body.is_empty() && status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }

    parse_json(&response)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], response.body).into_response())
}

/// Reads and updates: backend status and body verbatim.
pub fn relay_json(response: UpstreamResponse) -> Result<Response, ApiError> {
    let status = response.status;
    relay_with(response, status)
}

/// Creates answer 201 with the backend body.
pub fn relay_created(response: UpstreamResponse) -> Result<Response, ApiError> {
    relay_with(response, StatusCode::CREATED)
}

/// Deletes answer 204 with an empty body whatever the backend sent.
pub fn relay_deleted(_response: UpstreamResponse) -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Wrap the backend body in the `{success, data}` envelope.
pub fn relay_envelope(response: UpstreamResponse, status: StatusCode) -> Result<ApiResponse<Value>, ApiError> {
    let data = if response.body.is_empty() {
        Value::Null
    } else {
        parse_json(&response)?
    };
    Ok(ApiResponse::with_status(data, status))
}

/// Serialize a normalized payload for forwarding.
pub fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| {
        tracing::error!("Failed to serialize forwarded body: {}", e);
        ApiError::internal_server_error("Failed to build backend request")
    })
}
