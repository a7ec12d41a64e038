use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::users::validation::{normalize_email, normalize_username};
use crate::users::{User, UserResponse, UserUpdate};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<UserResponse>,
    pub count: usize,
}

/// Look up a live user from a path segment. Non-numeric IDs are simply unknown.
fn find_target(state: &AppState, id: &str) -> Result<User, ApiError> {
    id.parse::<u64>()
        .ok()
        .and_then(|id| state.users.find_by_id(id))
        .ok_or_else(ApiError::user_not_found)
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Json<UserList> {
    let users: Vec<UserResponse> = state
        .users
        .list_except(auth.id)
        .iter()
        .map(User::to_response)
        .collect();

    Json(UserList {
        count: users.len(),
        users,
    })
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(auth.id)
        .ok_or_else(ApiError::user_not_found)?;
    Ok(Json(user.to_response()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(find_target(&state, &id)?.to_response()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let target = find_target(&state, &id)?;
    if target.id != auth.id {
        return Err(ApiError::Forbidden("You can only update your own profile".into()));
    }

    let Json(req) = payload.map_err(|_| ApiError::invalid_payload())?;

    // Empty strings mean "leave unchanged".
    let mut update = UserUpdate::default();
    if let Some(username) = req.username.filter(|u| !u.is_empty()) {
        update.username =
            Some(normalize_username(&username).map_err(|m| ApiError::BadRequest(m.into()))?);
    }
    if let Some(email) = req.email.filter(|e| !e.is_empty()) {
        update.email = Some(normalize_email(&email).map_err(|m| ApiError::BadRequest(m.into()))?);
    }
    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".into()));
    }

    let user = state.users.update(target.id, update)?;
    tracing::info!(user_id = user.id, "User updated");
    Ok(Json(user.to_response()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let target = find_target(&state, &id)?;
    if target.id != auth.id {
        return Err(ApiError::Forbidden("You can only delete your own profile".into()));
    }

    state.users.soft_delete(target.id)?;
    tracing::info!(user_id = target.id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
