//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration. Everything is read once at startup and passed by value to
//! the collaborators; nothing re-reads the environment at request time.

use sessions_api::auth::{DEFAULT_SESSION_TTL_SECS, SessionSettings};
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Mount point for the session route
    pub base_path: String,
    /// Name of the user record kind
    pub record_kind: String,
    /// Session signing configuration
    pub session: SessionSettings,
    /// Database connection URL; in-memory store when unset
    pub database_url: Option<String>,
    /// Prometheus exporter bind address; disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        // Bind address
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:6969"
                    .parse()
                    .expect("Default bind address is valid")
            });

        // Database is optional: without it the server runs on the in-memory store
        let database_url = database_url_override.or_else(|| std::env::var("DATABASE_URL").ok());

        // Session configuration (secret REQUIRED)
        let secret = std::env::var("SESSION_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "SESSION_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        if secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "SESSION_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        let mut session = SessionSettings::new(secret);
        if let Ok(expose) = std::env::var("SESSION_EXPOSE") {
            session.expose = parse_expose(&expose);
        }
        if let Ok(cookie_name) = std::env::var("SESSION_COOKIE") {
            if !cookie_name.trim().is_empty() {
                session.cookie_name = cookie_name;
            }
        }
        session.ttl_secs = parse_env_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);

        // Record kind: read the provided value and fall back to the default
        let record_kind = std::env::var("RECORD_KIND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "User".to_string());

        let base_path = std::env::var("BASE_PATH").unwrap_or_else(|_| "/".to_string());

        let metrics_bind = std::env::var("METRICS_BIND")
            .ok()
            .and_then(|s| s.parse().ok());

        Ok(ServerConfig {
            bind,
            base_path,
            record_kind,
            session,
            database_url,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` on the first failed check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.expose.is_empty() {
            return Err(ConfigError::Invalid {
                var: "SESSION_EXPOSE".to_string(),
                reason: "Must name at least one field".to_string(),
            });
        }

        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !self.base_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "BASE_PATH".to_string(),
                reason: "Must start with '/'".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a comma-separated expose list, dropping blank entries
fn parse_expose(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
