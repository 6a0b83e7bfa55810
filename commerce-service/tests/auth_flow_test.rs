//! End-to-end account lifecycle against a live MongoDB. Run with
//! `cargo test -- --ignored` when an instance is available at MONGODB_URI.

mod common;

use axum::http::{Method, StatusCode};
use common::{authed_request, body_json, json_request, TestApp};
use commerce_service::services::SessionStore;
use mongodb::bson::doc;
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn register_login_delete_lifecycle() {
    let app = TestApp::spawn().await;
    app.state.db.initialize_indexes().await.unwrap();

    // Register; email arrives mixed-case and must come back normalized.
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            json!({ "name": "Ada", "email": "A@Example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], "a@example.com");
    assert_eq!(body["user"]["role"], "customer");
    let first_token = body["access_token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // Registration provisions the default wishlist and settings.
    let wishlist = app
        .state
        .db
        .lists()
        .find_one(doc! { "user_id": &user_id, "name": "Wishlist" }, None)
        .await
        .unwrap();
    assert!(wishlist.is_some());
    let settings = app
        .state
        .db
        .settings()
        .find_one(doc! { "user_id": &user_id }, None)
        .await
        .unwrap();
    assert!(settings.is_some());

    // Registration auto-logs-in: the returned token has a live session.
    assert!(app
        .state
        .sessions
        .resolve(&first_token)
        .await
        .unwrap()
        .is_some());

    // Login issues a distinct token.
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({ "email": "a@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let second_token = body["access_token"].as_str().unwrap().to_string();
    assert_ne!(first_token, second_token);

    // Delete with the first token.
    let response = app
        .router
        .clone()
        .oneshot(authed_request(
            Method::DELETE,
            "/auth/delete",
            &first_token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "account_deleted");

    // Both sessions are swept, the user record is gone.
    assert!(app
        .state
        .sessions
        .resolve(&first_token)
        .await
        .unwrap()
        .is_none());
    assert!(app
        .state
        .sessions
        .resolve(&second_token)
        .await
        .unwrap()
        .is_none());
    assert!(app.state.db.find_user_by_id(&user_id).await.unwrap().is_none());

    // Repeating delete with the same (unexpired) token fails at the session
    // gate, not the credential store.
    let response = app
        .router
        .clone()
        .oneshot(authed_request(
            Method::DELETE,
            "/auth/delete",
            &first_token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "session_expired");

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn duplicate_email_registration_conflicts() {
    let app = TestApp::spawn().await;
    app.state.db.initialize_indexes().await.unwrap();

    let payload = json!({ "name": "Ada", "email": "dup@example.com", "password": "password123" });

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/auth/register", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/auth/register", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "email_in_use");

    let count = app
        .state
        .db
        .users()
        .count_documents(doc! { "email": "dup@example.com" }, None)
        .await
        .unwrap();
    assert_eq!(count, 1);

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn wrong_password_is_uniform_invalid_credentials_and_creates_no_session() {
    let app = TestApp::spawn().await;
    app.state.db.initialize_indexes().await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/register",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let sessions_before = app
        .store
        .keys_with_prefix("session:")
        .await
        .unwrap()
        .len();

    // Wrong password and unknown user produce the same failure.
    for body in [
        json!({ "email": "ada@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": "password123" }),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(Method::POST, "/auth/login", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "invalid_credentials");
    }

    let sessions_after = app.store.keys_with_prefix("session:").await.unwrap().len();
    assert_eq!(sessions_before, sessions_after);

    app.teardown().await;
}
