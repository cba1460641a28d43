// HTTP API Error Types
use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::SessionError;
use crate::upstream::UpstreamError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        missing_fields: Vec<String>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error (backend answered with a failure)
    Upstream {
        message: String,
        backend_status: Option<u16>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 504 Gateway Timeout
    GatewayTimeout(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::Upstream { .. } => 500,
            ApiError::InternalServerError(_) => 500,
            ApiError::GatewayTimeout(_) => 504,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Upstream { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::GatewayTimeout(msg) => msg,
        }
    }

    /// Convert to JSON response body
    ///
    /// Session failures answer with `{"error": ...}`, everything else with
    /// `{"message": ...}`; the dashboard views read those keys.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Unauthorized(msg) => {
                json!({
                    "error": msg,
                    "code": self.error_code()
                })
            }
            ApiError::ValidationError { message, missing_fields } => {
                let mut response = json!({
                    "message": message,
                    "code": self.error_code()
                });

                if !missing_fields.is_empty() {
                    response["missing_fields"] = json!(missing_fields);
                }

                response
            }
            _ => {
                json!({
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::GatewayTimeout(_) => "UPSTREAM_TIMEOUT",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn missing_fields(missing_fields: Vec<String>) -> Self {
        ApiError::ValidationError {
            message: "Missing required fields".to_string(),
            missing_fields,
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn upstream(message: impl Into<String>, backend_status: Option<u16>) -> Self {
        ApiError::Upstream {
            message: message.into(),
            backend_status,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        ApiError::GatewayTimeout(message.into())
    }
}

// Convert other error types to ApiError
impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(after) => {
                tracing::error!("Backend request timed out after {:?}", after);
                ApiError::gateway_timeout(format!("Backend did not respond within {}s", after.as_secs()))
            }
            UpstreamError::InvalidPath(msg) => {
                tracing::error!("Could not build backend URL: {}", msg);
                ApiError::internal_server_error("Could not build backend request")
            }
            other => {
                tracing::error!("Backend transport error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(msg) => {
                tracing::error!("Session signing failed: {}", msg);
                ApiError::internal_server_error("Could not create session")
            }
            other => {
                tracing::warn!("Session rejected: {}", other);
                ApiError::unauthorized("Unauthorized")
            }
        }
    }
}

// Extractor rejections would otherwise answer text/plain
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!("Rejected query string: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Request body too large".to_string())
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
