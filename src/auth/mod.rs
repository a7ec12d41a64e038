//! Authentication: password hashing, bearer tokens, and the request guard.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{generate_token, validate_token, Claims, TokenError};
pub use middleware::{require_auth, AuthUser};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
