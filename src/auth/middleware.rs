use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::{validate_token, TokenError};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Identity attached to requests that passed the bearer guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: u64,
    pub username: String,
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Authorization header is required".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header format".into()))?;

    let claims = validate_token(token, &state.auth.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        match e {
            TokenError::Expired => ApiError::Unauthorized("Token has expired".into()),
            _ => ApiError::Unauthorized("Invalid token".into()),
        }
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.user_id,
        username: claims.username,
        email: claims.email,
    });
    Ok(next.run(request).await)
}
