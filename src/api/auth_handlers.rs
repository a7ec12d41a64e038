use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_token, hash_password, verify_password};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::users::validation::{normalize_email, normalize_username};
use crate::users::UserResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::invalid_payload())?;
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid_payload());
    }

    let username = normalize_username(&req.username).map_err(|m| ApiError::BadRequest(m.into()))?;
    let email = normalize_email(&req.email).map_err(|m| ApiError::BadRequest(m.into()))?;

    // Checked before hashing so duplicates don't pay for argon2.
    if state.users.exists(&username, &email) {
        return Err(crate::users::StoreError::Conflict.into());
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let user = state.users.create(&username, &email, &password_hash)?;
    let token = generate_token(&user, &state.auth)?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.to_response(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::invalid_payload())?;
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid_payload());
    }

    let invalid = || ApiError::Unauthorized("Invalid email or password".into());
    let email = req.email.trim().to_lowercase();

    let user = state.users.find_by_email(&email).ok_or_else(|| {
        tracing::warn!("Failed login attempt: unknown email");
        invalid()
    })?;

    let password = req.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;
    if !valid {
        tracing::warn!(user_id = user.id, "Failed login attempt: invalid password");
        return Err(invalid());
    }

    let token = generate_token(&user, &state.auth)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.to_response(),
    }))
}
