mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::json;

use coach_admin::state::AppState;
use coach_admin::upstream::UpstreamError;
use common::{call, session_cookie, test_state, RecordingUpstream};

#[tokio::test]
async fn plan_list_is_relayed_verbatim() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    let backend_body = r#"[{"plan_id":1,"name":"Pro","price":"49.00"}]"#;
    upstream.respond_raw(200, backend_body);

    let res = call(&state, Method::GET, "/api/subscription/plans", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, backend_body.as_bytes());
    assert_eq!(upstream.last().method, Method::GET);
}

#[tokio::test]
async fn plan_create_answers_201_with_normalized_body() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(200, json!({ "id": 1, "name": "Pro" }));
    let body = json!({ "name": "Pro", "price": 49.5, "duration_days": 30, "features": { "chat": true } });
    let res = call(&state, Method::POST, "/api/subscription/plans", Some(&cookie), Some(body)).await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json(), json!({ "id": 1, "name": "Pro" }));

    let forwarded = upstream.last();
    assert_eq!(forwarded.method, Method::POST);
    assert_eq!(forwarded.segments, vec!["plans"]);
    assert_eq!(forwarded.body.unwrap()["description"], "");
}

#[tokio::test]
async fn delete_is_204_with_empty_body() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(200, json!({ "message": "Subscription deleted" }));
    let res = call(&state, Method::DELETE, "/api/subscription/subscription/9", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());
    assert_eq!(upstream.last().segments, vec!["subscriptions", "9"]);
}

#[tokio::test]
async fn backend_message_surfaces_as_500() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(404, json!({ "message": "Plan not found" }));
    let res = call(&state, Method::GET, "/api/subscription/plans/77", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Plan not found");
}

#[tokio::test]
async fn non_json_backend_error_uses_route_fallback() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond_raw(502, "<html><body>Bad Gateway</body></html>");
    let res = call(&state, Method::GET, "/api/subscription/subscription", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Failed to fetch subscriptions");
}

#[tokio::test]
async fn backend_timeout_is_504() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.fail(UpstreamError::Timeout(Duration::from_secs(30)));
    let res = call(&state, Method::GET, "/api/subscription/subscription/stats", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(res.json()["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn unreachable_backend_is_500_json() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.fail(UpstreamError::Connect("connection refused".into()));
    let res = call(&state, Method::GET, "/api/coaches", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.json()["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn handler_panic_becomes_500_json() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.panic_next();
    let res = call(&state, Method::GET, "/api/coaches", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Internal server error");
}

#[tokio::test]
async fn expiring_soon_defaults_to_thirty_days() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(200, json!([]));
    let res = call(&state, Method::GET, "/api/subscription/subscription/expiring-soon", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::OK);
    let forwarded = upstream.last();
    assert_eq!(forwarded.segments, vec!["subscriptions", "expiring-soon"]);
    assert_eq!(forwarded.query, vec![("days".to_string(), "30".to_string())]);
}

#[tokio::test]
async fn cancel_and_renew_hit_their_backend_actions() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(200, json!({ "subscription_id": 4, "status": "cancelled" }));
    let res = call(
        &state,
        Method::POST,
        "/api/subscription/subscription/4/cancel",
        Some(&cookie),
        Some(json!({ "cancellation_reason": "moved away" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    let cancel = upstream.last();
    assert_eq!(cancel.segments, vec!["subscriptions", "4", "cancel"]);
    assert_eq!(cancel.body.unwrap()["cancellation_reason"], "moved away");

    upstream.respond(200, json!({ "subscription_id": 4, "status": "active" }));
    let res = call(&state, Method::POST, "/api/subscription/subscription/4/renew", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let renew = upstream.last();
    assert_eq!(renew.segments, vec!["subscriptions", "4", "renew"]);
    assert_eq!(renew.body.unwrap(), json!({ "payment_method": "", "payment_reference": "", "payment_notes": "" }));
}

#[tokio::test]
async fn users_answer_in_envelope() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond(200, json!([{ "_id": "a1", "email": "info@example.com" }]));
    let res = call(&state, Method::GET, "/api/users", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "success": true, "data": [{ "_id": "a1", "email": "info@example.com" }] }));

    upstream.respond(200, json!({ "_id": "a2" }));
    let body = json!({ "name": "Ann", "email": "ann@example.com", "password": "pw" });
    let res = call(&state, Method::POST, "/api/users/register", Some(&cookie), Some(body)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["data"]["_id"], "a2");
    assert_eq!(upstream.last().segments, vec!["admins", "register"]);
}

#[tokio::test]
async fn health_reports_backend_reachability() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());

    upstream.respond(404, json!({}));
    let res = call(&state, Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["status"], "ok");

    upstream.fail(UpstreamError::Connect("refused".into()));
    let res = call(&state, Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json()["data"]["status"], "degraded");
}

#[tokio::test]
async fn non_json_success_body_is_500() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond_raw(200, "<html><body>maintenance</body></html>");
    let res = call(&state, Method::GET, "/api/subscription/plans", Some(&cookie), None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Backend returned an invalid response");
}

#[tokio::test]
async fn empty_success_body_on_update_is_500() {
    let upstream = RecordingUpstream::new();
    let state = test_state(upstream.clone());
    let cookie = session_cookie(&state);

    upstream.respond_raw(200, "");
    let body = json!({ "name": "Pro", "price": 49, "duration_days": 30, "features": {} });
    let res = call(&state, Method::PUT, "/api/subscription/plans/3", Some(&cookie), Some(body)).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["code"], "UPSTREAM_ERROR");
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn wildcard_cors_origin_is_skipped() {
    let upstream = RecordingUpstream::new();
    let mut config = common::test_config();
    config.security.cors_origins = vec!["*".to_string(), "http://localhost:5173".to_string()];
    let state = AppState::with_upstream(config, upstream);

    let res = call(&state, Method::GET, "/", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
}
