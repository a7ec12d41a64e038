//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared layers)
//!     → request.rs (request ID, request span)
//!     → cors.rs (cross-origin policy)
//!     → api routes (limiters, auth guard, handlers)
//!     → response.rs (errors as {"error": ...})
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
