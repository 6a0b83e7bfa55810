use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ProductCreateRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[validate(length(min = 1, message = "Currency is required"))]
    pub currency: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: Option<i64>,

    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub attributes: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductUpdateRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,

    #[validate(length(min = 1, message = "Currency must not be empty"))]
    pub currency: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: Option<i64>,

    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub attributes: Option<Map<String, Value>>,
}

impl ProductUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.description.is_none()
            && self.inventory.is_none()
            && self.category.is_none()
            && self.images.is_none()
            && self.attributes.is_none()
    }
}

/// Catalog query parameters. `ids` takes precedence over `query`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub query: Option<String>,
    /// Comma-separated product ids.
    pub ids: Option<String>,
    pub limit: Option<i64>,
}
