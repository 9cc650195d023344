//! API configuration
//!
//! Loaded from `API_`-prefixed environment variables, with a `.env` file
//! read first when present.

use serde::Deserialize;
use std::str::FromStr;

use core_kernel::{TemporalError, Timezone};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// IANA zone that defines the business day, e.g. `Asia/Kolkata`
    pub timezone: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/factory_ledger".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment, defaulting unset fields
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs)?
            .set_default("database_url", defaults.database_url)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("log_level", defaults.log_level)?
            .set_default("timezone", defaults.timezone)?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured business timezone
    pub fn business_timezone(&self) -> Result<Timezone, TemporalError> {
        Timezone::from_str(&self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = ApiConfig {
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.server_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_business_timezone() {
        let config = ApiConfig {
            timezone: "Asia/Kolkata".to_string(),
            ..Default::default()
        };
        assert!(config.business_timezone().is_ok());

        let bad = ApiConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(bad.business_timezone().is_err());
    }
}
