//! Account API tests.

mod common;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use serde_json::Value;

use common::{fixtures, TestContext};

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_register_account() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/account/register")
        .json(&fixtures::register_request(Some("phone")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["account_id"].is_string());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_account_status() {
    let ctx = TestContext::new();
    let (account_id, token) = ctx.register().await;

    let response = ctx.get("/api/account/status", &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["account_id"], account_id.to_string());
    assert_eq!(body["name"], "test-account");
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/library").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_token() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/library", "not-a-real-token").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;

    let response = ctx
        .server
        .get("/api/library")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&token).unwrap())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_accounts_are_isolated() {
    let ctx = TestContext::new();
    let (_, first) = ctx.register().await;
    let (_, second) = ctx.register().await;

    ctx.add_verses(&first, 2, &[]).await;

    let library = ctx.library(&second).await;
    assert!(library["verses"].as_array().unwrap().is_empty());
}
