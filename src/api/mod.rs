//! REST API routes.
//!
//! ```text
//! POST   /api/auth/register   register limiter
//! POST   /api/auth/login      login limiter
//! GET    /api/users           auth → general limiter
//! GET    /api/users/me        auth → general limiter
//! GET    /api/users/{id}      auth → general limiter
//! PUT    /api/users/{id}      auth → general limiter
//! DELETE /api/users/{id}      auth → general limiter
//! ```

pub mod auth_handlers;
pub mod user_handlers;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::auth::require_auth;
use crate::http::server::AppState;
use crate::security::rate_limit_middleware;
use self::auth_handlers::{login, register};
use self::user_handlers::{current_user, delete_user, get_user, list_users, update_user};

pub fn setup_api_router(state: AppState) -> Router {
    let limiters = state.limiters.clone();

    let register_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route_layer(from_fn_with_state(limiters.register, rate_limit_middleware));

    let login_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route_layer(from_fn_with_state(limiters.login, rate_limit_middleware));

    // Layers run outermost-last: the auth guard rejects anonymous callers
    // before they can spend general quota.
    let user_routes = Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/me", get(current_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(from_fn_with_state(limiters.general, rate_limit_middleware))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(register_routes)
        .merge(login_routes)
        .merge(user_routes)
        .with_state(state)
}
