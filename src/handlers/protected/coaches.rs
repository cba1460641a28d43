use axum::{extract::State, http::Method, response::Response, Extension};

use crate::error::ApiError;
use crate::middleware::AdminSession;
use crate::proxy::{forward, relay_json};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/coaches - coach directory used by the subscription form
pub async fn coaches_list(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["coaches"]);
    let response = forward(&state, &session, request, "Failed to fetch coaches").await?;
    relay_json(response)
}
