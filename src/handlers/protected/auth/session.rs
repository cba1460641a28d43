use axum::Extension;

use crate::middleware::{AdminSession, ApiResponse};

/// GET /api/auth/session - Who is signed in
///
/// Answers with the admin identity held in the session. The backend access
/// token is not serialized.
pub async fn current(Extension(session): Extension<AdminSession>) -> ApiResponse<AdminSession> {
    ApiResponse::success(session)
}
