//! Account lifecycle handlers: register, login, logout, delete.
//!
//! Register and login bypass the authorization middleware and drive the
//! token service and session manager directly; logout and delete run behind
//! it.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mongodb::bson::doc;
use serde_json::{Map, Value};
use validator::Validate;

use crate::config::CookieConfig;
use crate::dtos::{
    auth::{AuthResponse, LoginRequest, RegisterRequest},
    MessageResponse,
};
use crate::middleware::{CurrentUser, SessionToken};
use crate::models::{ProductList, User, UserSettings};
use crate::services::database::is_duplicate_key_error;
use crate::services::{ServiceError, SessionSnapshot};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};
use crate::AppState;
use service_core::error::AppError;

/// Register a new account.
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    req.validate()?;

    let email = req.email.to_lowercase();

    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::EmailInUse.into());
    }

    let password_hash =
        hash_password(&Password::new(req.password)).map_err(ServiceError::Internal)?;

    let user = User::new(req.name, email, password_hash.into_string());

    // The pre-check above races against concurrent registrations; the unique
    // email index is what actually decides the winner.
    if let Err(e) = state.db.users().insert_one(&user, None).await {
        if is_duplicate_key_error(&e) {
            return Err(ServiceError::EmailInUse.into());
        }
        return Err(ServiceError::Database(e).into());
    }

    tracing::info!(user_id = %user.id, "User registered");

    // Default owned resources; separate writes, not atomic with the insert.
    state
        .db
        .lists()
        .insert_one(&ProductList::default_wishlist(user.id.clone()), None)
        .await
        .map_err(ServiceError::Database)?;
    state
        .db
        .settings()
        .insert_one(&UserSettings::defaults_for(user.id.clone()), None)
        .await
        .map_err(ServiceError::Database)?;

    let (token, response) = establish_session(&state, &user).await?;

    let jar = jar.add(auth_cookie(
        &state.config.cookie,
        token,
        state.config.session_ttl_seconds(),
    ));

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// Login with email and password.
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    req.validate()?;

    let email = req.email.to_lowercase();

    // Uniform failure for unknown email and wrong password alike.
    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    let password = Password::new(req.password);
    let stored = PasswordHashString::new(user.password_hash.clone());
    if !verify_password(&password, &stored) {
        return Err(ServiceError::InvalidCredentials.into());
    }

    let (token, response) = establish_session(&state, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(auth_cookie(
        &state.config.cookie,
        token,
        state.config.session_ttl_seconds(),
    ));

    Ok((jar, Json(response)))
}

/// Revoke this request's session and clear the cookie.
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    state.sessions.revoke(&token).await?;

    let jar = jar.remove(removal_cookie(&state.config.cookie));

    Ok((jar, Json(MessageResponse::new("logged_out"))))
}

/// Delete the account, then sweep the user's sessions.
///
/// DELETE /auth/delete
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let user_id = principal.id.to_string();

    if state.db.find_user_by_id(&user_id).await?.is_none() {
        return Err(ServiceError::UserNotFound.into());
    }

    state
        .db
        .users()
        .delete_one(doc! { "_id": &user_id }, None)
        .await
        .map_err(ServiceError::Database)?;

    tracing::info!(user_id = %user_id, "Account deleted");

    // Best-effort: if the sweep fails, the remaining sessions decay on their
    // own TTL and the account is still gone from the caller's perspective.
    if let Err(e) = state.sessions.revoke_all_for_user(&user_id).await {
        tracing::error!(user_id = %user_id, error = %e, "Session sweep failed after account deletion");
    }

    let jar = jar.remove(removal_cookie(&state.config.cookie));

    Ok((jar, Json(MessageResponse::new("account_deleted"))))
}

/// Issue a token for `user` and create the matching session record. Token and
/// session share one TTL so they decay together.
async fn establish_session(
    state: &AppState,
    user: &User,
) -> Result<(String, AuthResponse), ServiceError> {
    let mut claims = Map::new();
    claims.insert("email".to_string(), Value::String(user.email.clone()));
    claims.insert(
        "role".to_string(),
        Value::String(user.role.as_str().to_string()),
    );

    let token = state.tokens.issue(&user.id, &claims)?;

    let snapshot = SessionSnapshot {
        user_id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    state
        .sessions
        .create(&token, &snapshot, state.config.session_ttl_seconds())
        .await?;

    let response = AuthResponse::new(token.clone(), user.sanitized());
    Ok((token, response))
}

fn auth_cookie(config: &CookieConfig, token: String, max_age_seconds: i64) -> Cookie<'static> {
    let mut builder = Cookie::build((config.name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(&config.same_site))
        .max_age(time::Duration::seconds(max_age_seconds));

    if let Some(domain) = config.domain.clone() {
        builder = builder.domain(domain);
    }

    builder.build()
}

fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), "")).path("/").build()
}

fn same_site(value: &str) -> SameSite {
    match value.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
