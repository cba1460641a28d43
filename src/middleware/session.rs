use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{SessionClaims, SessionError};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin context resolved from the session cookie
#[derive(Clone, Debug, Serialize)]
pub struct AdminSession {
    pub admin_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    access_token: String,
}

impl AdminSession {
    /// Backend bearer token for forwarded requests.
    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            admin_id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
            expires_at,
            access_token: claims.access_token,
        }
    }
}

/// Session guard: resolves the session or short-circuits with 401.
///
/// Wraps every proxy route, so a request without a valid session never
/// reaches a handler and never produces a backend call.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    let token = session_token(&jar, &headers, state.sessions.cookie_name()).ok_or_else(|| {
        tracing::warn!("Unauthorized access to {} - no session", path);
        ApiError::unauthorized("Unauthorized")
    })?;

    let claims = state.sessions.verify(&token).map_err(|e: SessionError| {
        tracing::warn!("Unauthorized access to {} - {}", path, e);
        ApiError::unauthorized("Unauthorized")
    })?;

    let session = AdminSession::from(claims);
    tracing::debug!("Session resolved for admin {} on {}", session.admin_id, path);

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Session token from the cookie, falling back to `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
