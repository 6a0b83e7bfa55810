//! Orders: list history and create-with-checkout. Creating an order writes
//! the document first, then asks the gateway for a checkout session; a
//! gateway failure rolls the order back so no unpaid order survives.

use axum::{extract::State, http::StatusCode, Json};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use serde_json::Value;
use validator::Validate;

use crate::dtos::orders::{OrderCreateRequest, OrderCreatedResponse};
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::ServiceError;
use crate::utils::api_document;
use crate::AppState;
use service_core::error::AppError;

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Value>>, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let orders: Vec<Order> = state
        .db
        .orders()
        .find(doc! { "user_id": principal.id.to_string() }, options)
        .await
        .map_err(ServiceError::Database)?
        .try_collect()
        .await
        .map_err(ServiceError::Database)?;

    let body = orders
        .iter()
        .map(api_document)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<OrderCreateRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), AppError> {
    req.validate()?;

    let user_id = principal.id.to_string();
    let product_ids = req
        .items
        .iter()
        .filter_map(|item| item.product_id.clone())
        .collect();

    let order = Order::new(user_id.clone(), product_ids, req.name, req.address);
    state
        .db
        .orders()
        .insert_one(&order, None)
        .await
        .map_err(ServiceError::Database)?;

    let success_url = format!("{}/?checkout_complete=true", state.config.frontend_url);
    let cancel_url = format!("{}/cart", state.config.frontend_url);

    let session = match state
        .gateway
        .create_checkout_session(&req.items, &success_url, &cancel_url)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            // Roll the order back; the user never saw a payment page.
            if let Err(delete_err) = state
                .db
                .orders()
                .delete_one(doc! { "_id": &order.id, "user_id": &user_id }, None)
                .await
            {
                tracing::error!(
                    order_id = %order.id,
                    error = %delete_err,
                    "Failed to roll back order after gateway failure"
                );
            }
            return Err(ServiceError::Gateway(e).into());
        }
    };

    tracing::info!(order_id = %order.id, session_id = %session.id, "Order created");

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id: order.id,
            url: session.url,
        }),
    ))
}
