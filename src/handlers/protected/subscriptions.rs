// handlers/protected/subscriptions.rs - /api/subscription/subscription[/...]

use axum::{
    extract::{Path, Query, State},
    http::Method,
    response::Response,
    Extension,
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::AdminSession;
use crate::models::{CancelPayload, RenewPayload, SubscriptionCreate, SubscriptionUpdate};
use crate::proxy::{forward, payload, relay_created, relay_deleted, relay_json, to_body};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

const DEFAULT_EXPIRING_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<String>,
}

impl ExpiringQuery {
    fn days(&self) -> Result<u32, ApiError> {
        match self.days.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_EXPIRING_DAYS),
            Some(raw) => match raw.parse::<u32>() {
                Ok(days) if days > 0 => Ok(days),
                _ => Err(ApiError::bad_request(format!("days must be a positive integer, got '{}'", raw))),
            },
        }
    }
}

/// GET /api/subscription/subscription
pub async fn subscriptions_list(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["subscriptions"]);
    let response = forward(&state, &session, request, "Failed to fetch subscriptions").await?;
    relay_json(response)
}

/// POST /api/subscription/subscription
///
/// Requires `coach_id`, `plan_id`, `start_date` and `end_date`; payment
/// fields default to `""`.
pub async fn subscriptions_create(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let subscription: SubscriptionCreate = payload(&body, SubscriptionCreate::REQUIRED, "subscription")?;

    let request = UpstreamRequest::new(Method::POST, &["subscriptions"]).with_body(to_body(&subscription)?);
    let response = forward(&state, &session, request, "Failed to create subscription").await?;
    relay_created(response)
}

/// GET /api/subscription/subscription/:id
pub async fn subscription_get(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["subscriptions", id.as_str()]);
    let response = forward(&state, &session, request, "Failed to fetch subscription").await?;
    relay_json(response)
}

/// PUT /api/subscription/subscription/:id
///
/// Same required set as create. `status` falls back to `active` and
/// `payment_status` to `pending`.
pub async fn subscription_update(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let update: SubscriptionUpdate = payload(&body, SubscriptionUpdate::REQUIRED, "subscription")?;

    let request =
        UpstreamRequest::new(Method::PUT, &["subscriptions", id.as_str()]).with_body(to_body(&update)?);
    let response = forward(&state, &session, request, "Failed to update subscription").await?;
    relay_json(response)
}

/// DELETE /api/subscription/subscription/:id
pub async fn subscription_delete(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::DELETE, &["subscriptions", id.as_str()]);
    let response = forward(&state, &session, request, "Failed to delete subscription").await?;
    Ok(relay_deleted(response))
}

/// POST /api/subscription/subscription/:id/cancel
pub async fn subscription_cancel(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let cancel: CancelPayload = payload(&body, &[], "cancellation")?;

    let request = UpstreamRequest::new(Method::POST, &["subscriptions", id.as_str(), "cancel"])
        .with_body(to_body(&cancel)?);
    let response = forward(&state, &session, request, "Failed to cancel subscription").await?;
    relay_json(response)
}

/// POST /api/subscription/subscription/:id/renew
pub async fn subscription_renew(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    WithRejection(body, _): WithRejection<Bytes, ApiError>,
) -> Result<Response, ApiError> {
    let renew: RenewPayload = payload(&body, &[], "renewal")?;

    let request = UpstreamRequest::new(Method::POST, &["subscriptions", id.as_str(), "renew"])
        .with_body(to_body(&renew)?);
    let response = forward(&state, &session, request, "Failed to renew subscription").await?;
    relay_json(response)
}

/// GET /api/subscription/subscription/expiring-soon?days=N
pub async fn subscriptions_expiring(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    WithRejection(Query(query), _): WithRejection<Query<ExpiringQuery>, ApiError>,
) -> Result<Response, ApiError> {
    let days = query.days()?;
    tracing::info!("Fetching subscriptions expiring in the next {} days", days);

    let request =
        UpstreamRequest::new(Method::GET, &["subscriptions", "expiring-soon"]).with_query("days", days.to_string());
    let response = forward(&state, &session, request, "Failed to fetch expiring subscriptions").await?;
    relay_json(response)
}

/// GET /api/subscription/subscription/stats
pub async fn subscriptions_stats(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> Result<Response, ApiError> {
    let request = UpstreamRequest::new(Method::GET, &["subscriptions", "stats"]);
    let response = forward(&state, &session, request, "Failed to fetch subscription statistics").await?;
    relay_json(response)
}
