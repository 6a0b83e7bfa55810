//! Product lists. All routes sit behind the authorization middleware; every
//! query is scoped by the principal's user id. The registration-provisioned
//! "Wishlist" cannot be created, renamed, or deleted here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::lists::{ListCreateRequest, ListUpdateRequest};
use crate::middleware::CurrentUser;
use crate::models::list::WISHLIST_NAME;
use crate::models::ProductList;
use crate::services::ServiceError;
use crate::utils::{api_document, now_bson};
use crate::AppState;
use service_core::error::AppError;

fn list_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("list_not_found"))
}

/// GET /lists
pub async fn list_lists(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Value>>, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let lists: Vec<ProductList> = state
        .db
        .lists()
        .find(doc! { "user_id": principal.id.to_string() }, options)
        .await
        .map_err(ServiceError::Database)?
        .try_collect()
        .await
        .map_err(ServiceError::Database)?;

    let body = lists
        .iter()
        .map(api_document)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body))
}

/// POST /lists
pub async fn create_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<ListCreateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    req.validate()?;

    if req.name == WISHLIST_NAME {
        return Err(AppError::Forbidden(anyhow::anyhow!("cannot_create_wishlist")));
    }

    let product_ids = req
        .product_ids
        .unwrap_or_default()
        .into_iter()
        .filter(|id| Uuid::parse_str(id).is_ok())
        .collect();

    let list = ProductList::new(principal.id.to_string(), req.name, product_ids);
    state
        .db
        .lists()
        .insert_one(&list, None)
        .await
        .map_err(ServiceError::Database)?;

    Ok((StatusCode::CREATED, Json(api_document(&list)?)))
}

/// GET /lists/:list_id
pub async fn get_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(list_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let list = find_owned_list(&state, &principal.id.to_string(), &list_id).await?;
    Ok(Json(api_document(&list)?))
}

/// PUT /lists/:list_id
pub async fn update_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(list_id): Path<String>,
    Json(req): Json<ListUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = principal.id.to_string();
    let list = find_owned_list(&state, &user_id, &list_id).await?;

    if list.is_wishlist() {
        return Err(AppError::Forbidden(anyhow::anyhow!("cannot_modify_wishlist")));
    }

    req.validate()?;

    if req.name.as_deref() == Some(WISHLIST_NAME) {
        return Err(AppError::Forbidden(anyhow::anyhow!("cannot_update_list")));
    }

    if req.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("no_updates_provided")));
    }

    let mut set = Document::new();
    if let Some(name) = req.name {
        set.insert("name", name);
    }
    if let Some(product_ids) = req.product_ids {
        let product_ids: Vec<String> = product_ids
            .into_iter()
            .filter(|id| Uuid::parse_str(id).is_ok())
            .collect();
        set.insert("product_ids", product_ids);
    }
    set.insert("updated_at", now_bson()?);

    let result = state
        .db
        .lists()
        .update_one(
            doc! { "_id": &list_id, "user_id": &user_id },
            doc! { "$set": set },
            None,
        )
        .await
        .map_err(ServiceError::Database)?;

    if result.matched_count == 0 {
        return Err(list_not_found());
    }

    let updated = find_owned_list(&state, &user_id, &list_id).await?;
    Ok(Json(api_document(&updated)?))
}

/// POST /lists/:list_id/product/:product_id
pub async fn add_product_to_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((list_id, product_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let user_id = principal.id.to_string();

    let result = state
        .db
        .lists()
        .update_one(
            doc! { "_id": &list_id, "user_id": &user_id },
            doc! {
                "$addToSet": { "product_ids": &product_id },
                "$set": { "updated_at": now_bson()? },
            },
            None,
        )
        .await
        .map_err(ServiceError::Database)?;

    if result.matched_count == 0 {
        return Err(list_not_found());
    }

    let updated = find_owned_list(&state, &user_id, &list_id).await?;
    Ok(Json(api_document(&updated)?))
}

/// DELETE /lists/:list_id/product/:product_id
pub async fn remove_product_from_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((list_id, product_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let user_id = principal.id.to_string();

    let result = state
        .db
        .lists()
        .update_one(
            doc! { "_id": &list_id, "user_id": &user_id },
            doc! {
                "$pull": { "product_ids": &product_id },
                "$set": { "updated_at": now_bson()? },
            },
            None,
        )
        .await
        .map_err(ServiceError::Database)?;

    if result.matched_count == 0 {
        return Err(list_not_found());
    }
    if result.modified_count == 0 {
        return Err(AppError::BadRequest(anyhow::anyhow!("product_not_in_list")));
    }

    let updated = find_owned_list(&state, &user_id, &list_id).await?;
    Ok(Json(api_document(&updated)?))
}

/// DELETE /lists/:list_id
pub async fn delete_list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(list_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user_id = principal.id.to_string();
    let list = find_owned_list(&state, &user_id, &list_id).await?;

    if list.is_wishlist() {
        return Err(AppError::Forbidden(anyhow::anyhow!("cannot_delete_wishlist")));
    }

    let result = state
        .db
        .lists()
        .delete_one(doc! { "_id": &list_id, "user_id": &user_id }, None)
        .await
        .map_err(ServiceError::Database)?;

    if result.deleted_count == 0 {
        return Err(list_not_found());
    }

    Ok(Json(json!({ "deleted": true, "list_id": list_id })))
}

async fn find_owned_list(
    state: &AppState,
    user_id: &str,
    list_id: &str,
) -> Result<ProductList, AppError> {
    state
        .db
        .lists()
        .find_one(doc! { "_id": list_id, "user_id": user_id }, None)
        .await
        .map_err(ServiceError::Database)?
        .ok_or_else(list_not_found)
}
