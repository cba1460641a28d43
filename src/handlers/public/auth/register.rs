// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{
    extract::State,
    http::{Method, StatusCode},
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::models::PublicRegistration;
use crate::proxy::{payload, relay_envelope};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// POST /api/auth/register - Self-service sign-up
///
/// Expected Input:
/// ```json
/// { "firstname": "Jane", "lastname": "Doe", "email": "jane@example.com", "password": "..." }
/// ```
///
/// Creates a `user` role account on the backend. No session is opened; the
/// new account signs in through `/api/auth/login` like everyone else.
pub async fn register_post(
    State(state): State<AppState>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> ApiResult<Value> {
    let registration: PublicRegistration = payload(&body, PublicRegistration::REQUIRED, "registration")?;
    tracing::info!("Self-registration for {}", registration.email);

    let request =
        UpstreamRequest::new(Method::POST, &["admins", "register"]).with_body(registration.into_backend_body());
    let response = state.upstream.send(request).await?;

    if !response.is_success() {
        let message = response
            .error_message()
            .unwrap_or_else(|| "Registration failed".to_string());
        tracing::warn!("Self-registration rejected: {} ({})", response.status, message);
        return Err(ApiError::upstream(message, Some(response.status.as_u16())));
    }

    relay_envelope(response, StatusCode::CREATED)
}
