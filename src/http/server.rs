//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (user store, rate limiters, token settings)
//! - Create the Axum router with API routes and the health check
//! - Wire up middleware (tracing, request ID, CORS, timeouts, body limit)
//! - Start limiter cleanup tasks alongside the server
//! - Serve until shutdown

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::setup_api_router;
use crate::config::{AuthConfig, ServiceConfig};
use crate::http::cors::cors_layer;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::security::RateLimiters;
use crate::users::UserStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub auth: Arc<AuthConfig>,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            users: Arc::new(UserStore::new()),
            auth: Arc::new(config.auth.clone()),
            limiters: RateLimiters::from_config(&config.rate_limit),
        }
    }
}

/// HTTP server for the user service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .merge(setup_api_router(state))
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.cors))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or the process receives Ctrl+C/SIGTERM.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        for limiter in self.state.limiters.all() {
            tracing::info!(
                policy = %limiter.name(),
                limit = limiter.limit(),
                window_secs = limiter.window().as_secs(),
                "Rate limit policy active"
            );
        }
        let cleanup_interval = Duration::from_secs(self.config.rate_limit.cleanup_interval_secs);
        let cleanup_tasks = self.state.limiters.spawn_cleanup(cleanup_interval);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        // Cleanup has no external effects, so there is nothing to drain.
        for task in cleanup_tasks {
            task.abort();
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Shared state, e.g. for inspecting the user store.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
