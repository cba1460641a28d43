// handlers/public/auth/logout.rs - POST /api/auth/logout handler

use axum::{extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::state::AppState;

/// POST /api/auth/logout - Drop the session cookie
///
/// Sessions are stateless signed cookies, so logging out only tells the
/// browser to forget it. Always answers 204, with or without a session.
pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let name = state.sessions.cookie_name().to_string();
    let had_session = jar.get(&name).is_some();

    let jar = jar.remove(Cookie::build((name, "")).path("/"));
    if had_session {
        tracing::info!("Session cookie cleared");
    }

    (jar, StatusCode::NO_CONTENT)
}
