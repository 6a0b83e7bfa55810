use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ListCreateRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub product_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListUpdateRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    pub product_ids: Option<Vec<String>>,
}

impl ListUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.product_ids.is_none()
    }
}
