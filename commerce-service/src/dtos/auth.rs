use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PublicUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Body returned by register and login. The same token also travels in the
/// auth cookie for browser clients.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

impl AuthResponse {
    pub fn new(access_token: String, user: PublicUser) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            user,
        }
    }
}
