//! Authorization middleware: the gate every protected route sits behind.
//!
//! The chain runs in a fixed order, each step a distinct 401:
//! token extraction, cryptographic verification, session resolution (the
//! revocation enforcement point), subject cross-check, and id parsing. No
//! step mutates state; the only side effect is attaching the principal to
//! the request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::models::Role;
use crate::services::ServiceError;
use crate::AppState;
use service_core::error::AppError;

/// Authenticated identity for a single request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// The raw bearer token the request authenticated with; logout needs it to
/// revoke the right session.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&state.config.cookie.name, req.headers())
        .ok_or(ServiceError::MissingToken)?;

    let claims = state.tokens.verify(&token).map_err(ServiceError::from)?;

    // The session record is what makes revocation real: a token that still
    // verifies but has no session is treated as expired.
    let snapshot = state
        .sessions
        .resolve(&token)
        .await?
        .ok_or(ServiceError::SessionExpired)?;

    // Guards against stale session reuse across rotated tokens.
    if snapshot.user_id != claims.sub {
        return Err(ServiceError::SessionMismatch.into());
    }

    let user_id = Uuid::parse_str(&snapshot.user_id).map_err(|_| ServiceError::InvalidUserId)?;

    let principal = Principal {
        id: user_id,
        email: snapshot.email,
        role: snapshot.role,
    };

    req.extensions_mut().insert(principal);
    req.extensions_mut().insert(SessionToken(token));

    Ok(next.run(req).await)
}

/// Pull the token from the auth cookie, falling back to an
/// `Authorization: Bearer` header for non-browser clients.
fn extract_token(cookie_name: &str, headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        let value = cookie.value();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Extractor handing the principal to handlers behind the middleware.
pub struct CurrentUser(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "principal missing from request extensions; route not behind auth middleware"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_cookie_over_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token("access_token", &headers).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token("access_token", &headers).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn missing_and_malformed_headers_yield_none() {
        assert_eq!(extract_token("access_token", &HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token("access_token", &headers), None);

        // A cleared cookie must not count as a credential.
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(extract_token("access_token", &headers), None);
    }
}
