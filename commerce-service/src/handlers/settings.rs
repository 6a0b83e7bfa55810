//! Per-user settings, one document per account, created at registration.

use axum::{extract::State, Json};
use mongodb::bson::{doc, Document};
use serde_json::Value;
use validator::Validate;

use crate::dtos::settings::SettingsUpdateRequest;
use crate::middleware::CurrentUser;
use crate::services::ServiceError;
use crate::utils::{api_document, now_bson};
use crate::AppState;
use service_core::error::AppError;

fn settings_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("settings_not_found"))
}

/// GET /settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Value>, AppError> {
    let settings = state
        .db
        .settings()
        .find_one(doc! { "user_id": principal.id.to_string() }, None)
        .await
        .map_err(ServiceError::Database)?
        .ok_or_else(settings_not_found)?;

    Ok(Json(api_document(&settings)?))
}

/// PUT /settings
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<SettingsUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;

    if req.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("no_updates_provided")));
    }

    let user_id = principal.id.to_string();

    let mut set = Document::new();
    if let Some(value) = req.login_alerts {
        set.insert("loginAlerts", value);
    }
    if let Some(value) = req.trusted_devices {
        set.insert("trustedDevices", value);
    }
    if let Some(value) = req.analytics_tracking {
        set.insert("analyticsTracking", value);
    }
    if let Some(value) = req.personalized_recommendations {
        set.insert("personalizedRecommendations", value);
    }
    if let Some(value) = req.dark_mode {
        set.insert("darkMode", value);
    }
    if let Some(value) = req.compact_product_layout {
        set.insert("compactProductLayout", value);
    }
    set.insert("updated_at", now_bson()?);

    let result = state
        .db
        .settings()
        .update_one(doc! { "user_id": &user_id }, doc! { "$set": set }, None)
        .await
        .map_err(ServiceError::Database)?;

    if result.matched_count == 0 {
        return Err(settings_not_found());
    }

    let updated = state
        .db
        .settings()
        .find_one(doc! { "user_id": &user_id }, None)
        .await
        .map_err(ServiceError::Database)?
        .ok_or_else(settings_not_found)?;

    Ok(Json(api_document(&updated)?))
}
