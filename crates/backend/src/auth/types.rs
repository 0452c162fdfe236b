//! Auth-related types and configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// The user a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_days: i64,
    pub cookie_name: String,
    /// Adds `Secure` to refreshed cookies
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_duration_days: 7,
            cookie_name: "auth_token".to_string(),
            secure_cookies: std::env::var("RUST_ENV").unwrap_or_default() == "production",
        }
    }
}
