//! Registration and session handlers.

use actix_web::{HttpResponse, cookie::Cookie, cookie::time::Duration as CookieDuration, web};
use std::sync::Arc;

use quill_core::domain::User;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::dto::{IdentityResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::{Identity, TOKEN_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username must not be empty".to_string()));
    }

    // Duplicate usernames are rejected here and, concurrently, by the
    // unique constraint in the store.
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    // The plaintext never leaves this scope.
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(req.username, password_hash);
    let saved = state.users.insert(user).await?;

    tracing::info!(username = %saved.username, "User registered");

    Ok(HttpResponse::Ok().json(UserResponse {
        id: saved.id.to_string(),
        username: saved.username,
        created_at: saved.created_at.to_rfc3339(),
    }))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    // Only ever compared against this user's own hash.
    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::BadRequest("Wrong credentials".to_string()));
    }

    let token = token_service
        .issue(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(token_service.expiration_seconds()))
        .finish();

    tracing::info!(username = %user.username, "User logged in");

    Ok(HttpResponse::Ok().cookie(cookie).json(IdentityResponse {
        id: user.id.to_string(),
        username: user.username,
    }))
}

/// GET /profile - the resolved identity of the caller.
pub async fn profile(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(IdentityResponse {
        id: identity.user_id.to_string(),
        username: identity.username,
    }))
}

/// POST /logout - expires the session cookie. The token itself stays
/// valid until its expiry; there is no server-side revocation.
pub async fn logout() -> AppResult<HttpResponse> {
    let cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json("Logged out"))
}
