mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use coach_admin::client::{AdminHooks, ClientError, DashboardApi, DashboardClient, SwrOptions};
use common::{spawn_backend, spawn_proxy};

#[tokio::test]
async fn login_sets_cookie_and_unlocks_proxy() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let client = DashboardClient::new(&proxy)?;
    let data = client.login("info@example.com", "secret").await?;
    assert_eq!(data["user"]["email"], "info@example.com");

    let session = client.session().expect("session cookie");
    assert!(!session.value.contains(common::BACKEND_TOKEN));

    let hooks = AdminHooks::new(client, SwrOptions::default());
    let plans = hooks.plans().await;
    assert_eq!(plans.error, None);
    assert_eq!(plans.data.unwrap().as_array().unwrap().len(), 2);

    let users = hooks.users().await;
    assert_eq!(users.data.unwrap()["data"][0]["email"], "info@example.com");
    Ok(())
}

#[tokio::test]
async fn login_cookie_is_http_only() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/auth/login", proxy))
        .json(&json!({ "email": "info@example.com", "password": "secret" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()?
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/auth/login", proxy))
        .json(&json!({ "email": "info@example.com", "password": "nope" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn logout_clears_session() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let client = DashboardClient::new(&proxy)?;
    client.login("info@example.com", "secret").await?;
    client.logout().await?;
    assert!(client.session().is_none());

    let err = client.get("/api/subscription/plans").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    Ok(())
}

#[tokio::test]
async fn backend_error_message_reaches_client() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let client = DashboardClient::new(&proxy)?;
    client.login("info@example.com", "secret").await?;

    match client.delete("/api/subscription/plans/404").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Plan not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    client.delete("/api/subscription/plans/7").await?;
    Ok(())
}

#[tokio::test]
async fn slow_backend_times_out_with_504() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 1).await?;

    let client = DashboardClient::new(&proxy)?;
    client.login("info@example.com", "secret").await?;

    match client.get("/api/subscription/subscription/stats").await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 504),
        other => panic!("expected timeout, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn health_probes_backend() -> Result<()> {
    let backend = spawn_backend().await?;
    let proxy = spawn_proxy(&backend, 5).await?;

    let res = reqwest::get(format!("{}/health", proxy)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let dead = spawn_proxy("http://127.0.0.1:9/api", 1).await?;
    let res = reqwest::get(format!("{}/health", dead)).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
