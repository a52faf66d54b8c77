//! Configuration management using environment variables
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. Every variable has a development default except where noted.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Redis configuration
    pub redis: RedisConfig,

    /// Alert error store configuration
    pub store: StoreConfig,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis host
    pub host: String,

    /// Redis port
    pub port: u16,

    /// Redis password (optional)
    pub password: Option<String>,

    /// Direct Redis URL (takes precedence over host/port/password)
    /// Supports both `redis://` and `rediss://` (TLS) schemes
    pub url: Option<String>,
}

impl RedisConfig {
    /// Build a Redis connection URL
    ///
    /// If `url` is set (from REDIS_URL env var), uses that directly.
    /// Otherwise, builds URL from host/port/password components.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        if let Some(password) = &self.password {
            format!("redis://:{}@{}:{}", password, self.host, self.port)
        } else {
            format!("redis://{}:{}", self.host, self.port)
        }
    }
}

/// Alert error store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Key prefix isolating the store from other users of the same Redis
    /// database. `None` keeps the bare key names.
    pub namespace: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            redis: RedisConfig {
                host: env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: env::var("REDIS_PORT")
                    .unwrap_or_else(|_| "6379".to_string())
                    .parse()
                    .map_err(|e| Error::config(format!("Invalid REDIS_PORT: {}", e)))?,
                password: env::var("REDIS_PASSWORD").ok(),
                url: env::var("REDIS_URL").ok(),
            },
            store: StoreConfig {
                namespace: parse_namespace(env::var("ALERT_ERRORS_NAMESPACE").ok())?,
            },
        })
    }
}

/// Normalize the namespace variable: blank means no namespace.
fn parse_namespace(raw: Option<String>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::config(format!(
            "Invalid ALERT_ERRORS_NAMESPACE: '{}' must not contain whitespace",
            trimmed
        )));
    }

    Ok(Some(trimmed.trim_end_matches(':').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_connection_url_with_password() {
        let config = RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: Some("secret".to_string()),
            url: None,
        };

        assert_eq!(config.connection_url(), "redis://:secret@localhost:6379");
    }

    #[test]
    fn test_redis_connection_url_without_password() {
        let config = RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            url: None,
        };

        assert_eq!(config.connection_url(), "redis://localhost:6379");
    }

    #[test]
    fn test_redis_connection_url_with_direct_url() {
        let config = RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: Some("ignored".to_string()),
            url: Some("rediss://:authtoken@redis.example.com:6379".to_string()),
        };

        // Direct URL takes precedence over host/port/password
        assert_eq!(
            config.connection_url(),
            "rediss://:authtoken@redis.example.com:6379"
        );
    }

    #[test]
    fn test_namespace_unset_or_blank() {
        assert_eq!(parse_namespace(None).unwrap(), None);
        assert_eq!(parse_namespace(Some("   ".to_string())).unwrap(), None);
    }

    #[test]
    fn test_namespace_strips_trailing_separator() {
        assert_eq!(
            parse_namespace(Some("bosun:".to_string())).unwrap(),
            Some("bosun".to_string())
        );
        assert_eq!(
            parse_namespace(Some(" prod ".to_string())).unwrap(),
            Some("prod".to_string())
        );
    }

    #[test]
    fn test_namespace_rejects_inner_whitespace() {
        let err = parse_namespace(Some("my ns".to_string())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
