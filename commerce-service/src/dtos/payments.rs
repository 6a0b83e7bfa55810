use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line item of a checkout. `product_id` is present when checking out
/// catalog products (orders flow) and absent for ad-hoc payment sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutItem {
    pub product_id: Option<String>,

    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,

    /// Unit amount in major currency units.
    #[validate(range(min = 0.0, message = "Amount must not be negative"))]
    pub amount: f64,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,

    #[validate(length(min = 1, message = "Currency is required"))]
    pub currency: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutSessionRequest {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}
