pub mod auth;
pub mod lists;
pub mod orders;
pub mod payments;
pub mod products;
pub mod settings;

use serde::Serialize;

/// Response for simple confirmation endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
