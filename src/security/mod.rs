//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! /api/auth/register → rate_limit.rs (register policy) → handler
//! /api/auth/login    → rate_limit.rs (login policy)    → handler
//! /api/users/*       → auth guard → rate_limit.rs (general policy) → handler
//! ```
//!
//! # Design Decisions
//! - One limiter instance per policy, each with its own key space
//! - Throttled requests never reach a handler or the user store
//! - Keyed by the peer IP address

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter, RateLimiters, RATE_LIMIT_MESSAGE};
