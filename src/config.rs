//! Configuration management for the CRM server.
//!
//! Configuration is read from environment variables:
//! - `JWT_SECRET` - Required. Secret used to sign access tokens.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATABASE_PATH` - Optional. SQLite database file. Defaults to `micro-crm.db`.
//! - `ACCESS_TOKEN_EXPIRE_MINUTES` - Optional. Token lifetime. Defaults to `60`.
//! - `CORS_ORIGINS` - Optional. Comma-separated allowed origins.
//! - `RATE_LIMIT_AUTH_PER_MIN` - Optional. Login/register requests per minute per IP. Defaults to `5`.
//! - `RATE_LIMIT_API_PER_MIN` - Optional. API requests per minute per user. Defaults to `60`.
//! - `SCAN_INTERVAL_SECS` - Optional. Overdue scan cadence. Defaults to `3600`.
//! - `SCAN_RETRY_SECS` - Optional. Overdue scan backoff after an error. Defaults to `300`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn env_parse<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Auth endpoint rate limit (requests per minute, keyed by client IP)
    pub rate_limit_auth_per_min: usize,

    /// API rate limit (requests per minute, keyed by authenticated user)
    pub rate_limit_api_per_min: usize,

    /// Overdue scan cadence after a successful iteration
    pub scan_interval: Duration,

    /// Overdue scan backoff after a failed iteration
    pub scan_retry_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `JWT_SECRET` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("PORT", "3000")?;

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("micro-crm.db"));

        let access_token_expire_minutes = env_parse("ACCESS_TOKEN_EXPIRE_MINUTES", "60")?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });

        let rate_limit_auth_per_min = env_parse("RATE_LIMIT_AUTH_PER_MIN", "5")?;
        let rate_limit_api_per_min = env_parse("RATE_LIMIT_API_PER_MIN", "60")?;

        let scan_interval = Duration::from_secs(env_parse("SCAN_INTERVAL_SECS", "3600")?);
        let scan_retry_interval = Duration::from_secs(env_parse("SCAN_RETRY_SECS", "300")?);

        Ok(Self {
            host,
            port,
            database_path,
            jwt_secret,
            access_token_expire_minutes,
            cors_origins,
            rate_limit_auth_per_min,
            rate_limit_api_per_min,
            scan_interval,
            scan_retry_interval,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn for_tests(database_path: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path,
            jwt_secret: "test-secret".to_string(),
            access_token_expire_minutes: 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
            rate_limit_auth_per_min: 5,
            rate_limit_api_per_min: 60,
            scan_interval: Duration::from_secs(3600),
            scan_retry_interval: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_default() {
        let port: u16 = env_parse("MICRO_CRM_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_env_parse_invalid() {
        std::env::set_var("MICRO_CRM_TEST_BAD_PORT", "not-a-number");
        let result: Result<u16, _> = env_parse("MICRO_CRM_TEST_BAD_PORT", "3000");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_, _))));
        std::env::remove_var("MICRO_CRM_TEST_BAD_PORT");
    }
}
