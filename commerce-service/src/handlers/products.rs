//! Public catalog CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::products::{ProductCreateRequest, ProductUpdateRequest, ProductsQuery};
use crate::models::product::document_from_json;
use crate::models::Product;
use crate::services::ServiceError;
use crate::utils::{api_document, now_bson};
use crate::AppState;
use service_core::error::AppError;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut filter = Document::new();
    if let Some(ids) = params.ids.as_deref().filter(|s| !s.trim().is_empty()) {
        let ids: Vec<String> = ids
            .split(',')
            .map(str::trim)
            .filter(|id| Uuid::parse_str(id).is_ok())
            .map(String::from)
            .collect();
        if ids.is_empty() {
            return Ok(Json(Vec::new()));
        }
        filter.insert("_id", doc! { "$in": ids });
    } else if let Some(query) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        filter.insert("name", doc! { "$regex": query, "$options": "i" });
    }

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .build();

    let products: Vec<Product> = state
        .db
        .products()
        .find(filter, options)
        .await
        .map_err(ServiceError::Database)?
        .try_collect()
        .await
        .map_err(ServiceError::Database)?;

    let body = products
        .iter()
        .map(api_document)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    req.validate()?;

    let product = Product::from_request(req);
    state
        .db
        .products()
        .insert_one(&product, None)
        .await
        .map_err(ServiceError::Database)?;

    Ok((StatusCode::CREATED, Json(api_document(&product)?)))
}

/// GET /products/:product_id
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let product = state
        .db
        .products()
        .find_one(doc! { "_id": &product_id }, None)
        .await
        .map_err(ServiceError::Database)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("product_not_found")))?;

    Ok(Json(api_document(&product)?))
}

/// PUT /products/:product_id
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(req): Json<ProductUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;

    if req.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("no_updates_provided")));
    }

    let mut set = Document::new();
    if let Some(name) = req.name {
        set.insert("name", name);
    }
    if let Some(price) = req.price {
        set.insert("price", price);
    }
    if let Some(currency) = req.currency {
        set.insert("currency", currency);
    }
    if let Some(description) = req.description {
        set.insert("description", description);
    }
    if let Some(inventory) = req.inventory {
        set.insert("inventory", inventory);
    }
    if let Some(category) = req.category {
        set.insert("category", category);
    }
    if let Some(images) = req.images {
        set.insert("images", images);
    }
    if let Some(attributes) = req.attributes {
        set.insert("attributes", document_from_json(attributes));
    }
    set.insert("updated_at", now_bson()?);

    let result = state
        .db
        .products()
        .update_one(doc! { "_id": &product_id }, doc! { "$set": set }, None)
        .await
        .map_err(ServiceError::Database)?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("product_not_found")));
    }

    let product = state
        .db
        .products()
        .find_one(doc! { "_id": &product_id }, None)
        .await
        .map_err(ServiceError::Database)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("product_not_found")))?;

    Ok(Json(api_document(&product)?))
}

/// DELETE /products/:product_id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let result = state
        .db
        .products()
        .delete_one(doc! { "_id": &product_id }, None)
        .await
        .map_err(ServiceError::Database)?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("product_not_found")));
    }

    Ok(Json(json!({ "deleted": true, "product_id": product_id })))
}
