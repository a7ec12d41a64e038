//! Per-client rate limiting with a rolling time window.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::task::JoinHandle;

use crate::config::{RateLimitConfig, RatePolicy};
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Body returned to throttled clients.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Drop every timestamp that has fallen out of the window.
///
/// Timestamps are appended in order, so stale ones are always at the front.
fn prune(history: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = history.front() {
        if now.saturating_duration_since(oldest) >= window {
            history.pop_front();
        } else {
            break;
        }
    }
}

/// In-memory limiter allowing at most `limit` events per key within any
/// trailing `window`.
///
/// One instance enforces one policy. Denied attempts are not recorded, so a
/// throttled client regains quota as soon as its oldest allowed event ages out.
pub struct RateLimiter {
    /// Policy name used in logs and metrics.
    name: String,
    limit: usize,
    window: Duration,
    history: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter for one policy.
    ///
    /// `limit` must be at least 1 and `window` non-zero; configuration
    /// validation rejects anything else before a limiter is built.
    pub fn new(name: impl Into<String>, limit: usize, window: Duration) -> Self {
        debug_assert!(limit >= 1, "rate limit must be at least 1");
        debug_assert!(!window.is_zero(), "rate limit window must be non-zero");
        Self {
            name: name.into(),
            limit,
            window,
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an event for `key` if it is within quota.
    ///
    /// Returns `false` without recording anything when the key has already
    /// used its `limit` events in the current window.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub(crate) fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut history = self.history.lock().expect("rate limiter mutex poisoned");

        if let Some(events) = history.get_mut(key) {
            prune(events, now, self.window);
            if events.len() >= self.limit {
                return false;
            }
            events.push_back(now);
            return true;
        }

        history.insert(key.to_string(), VecDeque::from([now]));
        true
    }

    /// Prune every key and forget the ones with no recent events.
    ///
    /// Only reclaims memory; it never changes the outcome of a later `allow`.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub(crate) fn cleanup_at(&self, now: Instant) {
        let mut history = self.history.lock().expect("rate limiter mutex poisoned");
        let before = history.len();
        history.retain(|_, events| {
            prune(events, now, self.window);
            !events.is_empty()
        });

        let removed = before - history.len();
        if removed > 0 {
            tracing::debug!(policy = %self.name, removed, remaining = history.len(), "Rate limiter cleanup");
        }
        metrics::record_limiter_keys(&self.name, history.len());
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.history.lock().expect("rate limiter mutex poisoned").len()
    }

    /// Run `cleanup` every `interval` for as long as the limiter is alive.
    ///
    /// The task only holds a weak reference and exits once the last strong
    /// reference to the limiter is dropped.
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => limiter.cleanup(),
                    None => break,
                }
            }
        })
    }
}

/// Middleware gating a route group behind a limiter, keyed by client IP.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = addr.ip().to_string();

    if limiter.allow(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, policy = %limiter.name(), "Rate limit exceeded");
        metrics::record_rate_limited(limiter.name());
        ApiError::RateLimited.into_response()
    }
}

/// The three independent policies the service enforces.
#[derive(Clone)]
pub struct RateLimiters {
    pub register: Arc<RateLimiter>,
    pub login: Arc<RateLimiter>,
    pub general: Arc<RateLimiter>,
}

impl RateLimiters {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let build = |name: &str, policy: &RatePolicy| {
            Arc::new(RateLimiter::new(name, policy.limit, policy.window()))
        };
        Self {
            register: build("register", &config.register),
            login: build("login", &config.login),
            general: build("general", &config.general),
        }
    }

    pub fn all(&self) -> [&Arc<RateLimiter>; 3] {
        [&self.register, &self.login, &self.general]
    }

    /// Start one cleanup task per policy.
    pub fn spawn_cleanup(&self, interval: Duration) -> Vec<JoinHandle<()>> {
        self.all()
            .into_iter()
            .map(|limiter| limiter.spawn_cleanup(interval))
            .collect()
    }
}
