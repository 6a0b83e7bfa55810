use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

/// A current timestamp through the same serde path the models use, so
/// `updated_at` written by `$set` stays representationally identical to the
/// one written at insert.
pub fn now_bson() -> Result<mongodb::bson::Bson, AppError> {
    mongodb::bson::to_bson(&chrono::Utc::now())
        .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
}

/// Serialize a store document for an API response, renaming `_id` to `id`.
pub fn api_document<T: Serialize>(value: &T) -> Result<Value, AppError> {
    let mut json =
        serde_json::to_value(value).map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

    if let Some(object) = json.as_object_mut() {
        if let Some(id) = object.remove("_id") {
            object.insert("id".to_string(), id);
        }
    }

    Ok(json)
}
