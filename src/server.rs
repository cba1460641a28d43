use std::any::Any;
use std::future::Future;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::require_session;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// Full application router: public routes, the session-gated proxy and the
/// global layers.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Session acquisition
        .merge(auth_public_routes())
        // Session-gated proxy
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(handle_panic));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// Bind-agnostic serve loop shared by the binary and the end-to-end tests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Coach admin listening on http://{}, backend {}", addr, state.upstream.describe());

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
    }
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(public::login_post))
        .route("/api/auth/logout", post(public::logout_post))
        .route("/api/auth/register", post(public::register_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(session_routes())
        .merge(plan_routes())
        .merge(subscription_routes())
        .merge(user_routes())
        .merge(coach_routes())
        // route_layer keeps unknown paths at 404 instead of 401
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn session_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/session", get(auth::session_current))
}

fn plan_routes() -> Router<AppState> {
    use protected::plans;

    Router::new()
        .route(
            "/api/subscription/plans",
            get(plans::plans_list).post(plans::plans_create),
        )
        .route(
            "/api/subscription/plans/:id",
            get(plans::plan_get)
                .put(plans::plan_update)
                .delete(plans::plan_delete),
        )
}

fn subscription_routes() -> Router<AppState> {
    use protected::subscriptions as subs;

    Router::new()
        .route(
            "/api/subscription/subscription",
            get(subs::subscriptions_list).post(subs::subscriptions_create),
        )
        // Static segments win over :id
        .route(
            "/api/subscription/subscription/expiring-soon",
            get(subs::subscriptions_expiring),
        )
        .route("/api/subscription/subscription/stats", get(subs::subscriptions_stats))
        .route(
            "/api/subscription/subscription/:id",
            get(subs::subscription_get)
                .put(subs::subscription_update)
                .delete(subs::subscription_delete),
        )
        .route("/api/subscription/subscription/:id/cancel", post(subs::subscription_cancel))
        .route("/api/subscription/subscription/:id/renew", post(subs::subscription_renew))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::users_list))
        .route("/api/users/register", post(users::users_register))
}

fn coach_routes() -> Router<AppState> {
    Router::new().route("/api/coaches", get(protected::coaches::coaches_list))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            // AllowOrigin::list panics on a wildcard, and credentials forbid one anyway
            let wildcard = origin.trim() == "*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin; list origins explicitly");
            }
            !wildcard
        })
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "message": "Internal server error",
            "code": "INTERNAL_SERVER_ERROR"
        })),
    )
        .into_response()
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Coach Admin",
            "version": version,
            "environment": state.config.environment,
            "description": "Session-gated proxy for the coach subscription API",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/api/auth/login, /api/auth/logout, /api/auth/register (public)",
                "session": "/api/auth/session (protected)",
                "plans": "/api/subscription/plans[/:id] (protected)",
                "subscriptions": "/api/subscription/subscription[/:id[/cancel|/renew]|/expiring-soon|/stats] (protected)",
                "users": "/api/users, /api/users/register (protected)",
                "coaches": "/api/coaches (protected)",
            }
        }
    }))
}

/// Any answer from the backend counts as reachable; only transport
/// failures degrade the probe.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.upstream.describe();

    match state.upstream.send(UpstreamRequest::new(Method::GET, &[])).await {
        Ok(response) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "backend": backend,
                    "backend_status": response.status.as_u16()
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check could not reach backend {}: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "backend unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "backend": backend,
                        "backend_error": e.to_string()
                    }
                })),
            )
        }
    }
}
