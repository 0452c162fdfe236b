//! JWT-based authentication.
//!
//! Tokens are issued elsewhere; this module validates them and resolves the
//! calling user:
//! - JWT token creation (for sliding refresh) and validation
//! - `require_auth` middleware that puts an [`AuthUser`] into request extensions

pub(crate) mod jwt;
mod middleware;
pub mod types;

pub use middleware::require_auth;
pub use types::{AuthConfig, AuthUser};
