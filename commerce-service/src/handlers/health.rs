use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Liveness; touches no dependency.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn mongo_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "mongo_status": "ok" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "mongo_status": "error", "details": e.to_string() })),
        ),
    }
}

pub async fn redis_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.sessions.health_check().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "redis_status": "ok" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "redis_status": "error", "details": e.to_string() })),
        ),
    }
}
