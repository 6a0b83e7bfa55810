//! Ad-hoc checkout sessions, not tied to an order document.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::dtos::payments::{CheckoutSessionRequest, CheckoutSessionResponse};
use crate::services::ServiceError;
use crate::AppState;
use service_core::error::AppError;

/// POST /payments/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(req): Json<CheckoutSessionRequest>,
) -> Result<(StatusCode, Json<CheckoutSessionResponse>), AppError> {
    req.validate()?;

    let success_url = format!("{}/?checkout_complete=true", state.config.frontend_url);
    let cancel_url = format!("{}/cart", state.config.frontend_url);

    let session = state
        .gateway
        .create_checkout_session(&req.items, &success_url, &cancel_url)
        .await
        .map_err(ServiceError::Gateway)?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutSessionResponse { url: session.url }),
    ))
}
