use service_core::error::AppError;
use thiserror::Error;

use crate::services::jwt::TokenError;

/// Domain error kinds. The `Display` strings double as the wire-level error
/// codes for the 4xx kinds.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("missing_token")]
    MissingToken,

    #[error("invalid_token")]
    InvalidToken,

    #[error("expired_token")]
    ExpiredToken,

    #[error("session_expired")]
    SessionExpired,

    #[error("session_mismatch")]
    SessionMismatch,

    #[error("invalid_user_id")]
    InvalidUserId,

    #[error("email_in_use")]
    EmailInUse,

    #[error("invalid_credentials")]
    InvalidCredentials,

    #[error("user_not_found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Session cache error: {0}")]
    Cache(anyhow::Error),

    #[error("Payment gateway error: {0}")]
    Gateway(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ServiceError::ExpiredToken,
            TokenError::Invalid => ServiceError::InvalidToken,
            TokenError::ReservedClaim(key) => {
                ServiceError::Internal(anyhow::anyhow!("reserved claim key: {}", key))
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingToken
            | ServiceError::InvalidToken
            | ServiceError::ExpiredToken
            | ServiceError::SessionExpired
            | ServiceError::SessionMismatch
            | ServiceError::InvalidUserId
            | ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::EmailInUse => AppError::Conflict(anyhow::anyhow!("email_in_use")),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("user_not_found")),
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Cache(e) => AppError::InternalError(e.context("session cache unavailable")),
            ServiceError::Gateway(e) => AppError::BadGateway(e.to_string()),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
