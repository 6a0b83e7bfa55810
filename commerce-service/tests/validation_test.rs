//! Request validation rejects bad payloads before any store access.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, json_request, TestApp};
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn register_with_invalid_email_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            json!({ "name": "Ada", "email": "not-an-email", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_payload");
    assert!(body["details"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn register_with_short_password_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_empty_name_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            json!({ "name": "", "email": "ada@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_invalid_email_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({ "email": "not-an-email", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
