use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dtos::payments::CheckoutItem;

#[derive(Debug, Deserialize, Validate)]
pub struct OrderCreateRequest {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<CheckoutItem>,

    /// Recipient name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 10, message = "Address must be at least 10 characters"))]
    pub address: String,
}

/// 201 body: the stored order plus the gateway redirect.
#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
    pub url: String,
}
