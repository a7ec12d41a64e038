//! User accounts.
//!
//! # Data Flow
//! ```text
//! request body
//!     → validation.rs (normalize username/email)
//!     → store.rs (uniqueness, insert/update/soft delete)
//!     → model.rs (UserResponse for the wire)
//! ```

pub mod model;
pub mod store;
pub mod validation;

pub use model::{User, UserResponse, UserUpdate};
pub use store::{StoreError, UserStore};
