use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_tls: bool,
    pub database_pool_size: usize,
    pub port: u16,
    pub jwt_secret: String,
    pub cors_allowed_origins: Option<String>,
    pub frontend_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_tls: parse_flag(env::var("DATABASE_TLS").ok().as_deref())
                .context("DATABASE_TLS must be true or false")?,
            database_pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_POOL_SIZE must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            frontend_dir: env::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend/dist".to_string()),
        })
    }
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            other => anyhow::bail!("unrecognized flag value: {}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag(None).unwrap());
        assert!(!parse_flag(Some("false")).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some(" 1 ")).unwrap());
        assert!(parse_flag(Some("maybe")).is_err());
    }
}
