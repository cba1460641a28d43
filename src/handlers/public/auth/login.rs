// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{extract::State, http::Method};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::models::{LoginRequest, LoginResponse};
use crate::proxy::{payload, to_body};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// POST /api/auth/login - Authenticate against the backend and open a session
///
/// Expected Input:
/// ```json
/// { "email": "admin@example.com", "password": "secret" }
/// ```
///
/// The backend answers `{ "user": {...}, "token": "..." }`. The token is kept
/// inside the signed session cookie and is never returned to the browser.
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let credentials: LoginRequest = payload(&body, &["email", "password"], "credentials")?;
    tracing::info!("Login attempt for {}", credentials.email);

    let request = UpstreamRequest::new(Method::POST, &["admins", "login"]).with_body(to_body(&credentials)?);
    let response = state.upstream.send(request).await?;

    if !response.is_success() {
        tracing::warn!(
            "Login rejected for {}: backend answered {} ({})",
            credentials.email,
            response.status,
            response.error_message().unwrap_or_default()
        );
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let login: LoginResponse = serde_json::from_slice(&response.body).map_err(|e| {
        tracing::warn!("Unreadable login response for {}: {}", credentials.email, e);
        ApiError::unauthorized("Invalid credentials")
    })?;

    let (admin, access_token) = match (login.user, login.token.filter(|t| !t.is_empty())) {
        (Some(admin), Some(token)) => (admin, token),
        _ => {
            tracing::warn!("Login response for {} carried no user or token", credentials.email);
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let (token, claims) = state.sessions.issue(&admin, access_token)?;

    let cookie = Cookie::build((state.sessions.cookie_name().to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.sessions.secure_cookie())
        .max_age(cookie::time::Duration::seconds(state.sessions.max_age().num_seconds()));

    tracing::info!("Session opened for admin {} until {}", claims.sub, claims.expires_at());

    Ok((
        jar.add(cookie),
        ApiResponse::success(json!({
            "user": admin,
            "expires_at": claims.expires_at(),
        })),
    ))
}
