//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; nothing is re-read per request.

use std::env;

/// URL of the ministry's nationwide station price snapshot.
const DEFAULT_FUEL_API_URL: &str =
    "https://sedeaplicaciones.minetur.gob.es/ServiciosRESTCarburantes/PreciosCarburantes/EstacionesTerrestres/";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string
    pub database_url: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Fuel price feed endpoint
    pub fuel_api_url: String,
    /// Fuel price feed timeout. The snapshot is ~8k records, so this must
    /// be generous.
    pub fuel_api_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            fuel_api_url: env::var("FUEL_API_URL")
                .unwrap_or_else(|_| DEFAULT_FUEL_API_URL.to_string()),
            fuel_api_timeout_secs: env::var("FUEL_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            database_url: "postgres://localhost/mygasolinera_test".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 3000,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            fuel_api_url: DEFAULT_FUEL_API_URL.to_string(),
            fuel_api_timeout_secs: 30,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/test");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "postgres://localhost/test");
        assert_eq!(config.port, 3000);
        assert_eq!(config.fuel_api_timeout_secs, 30);
        assert!(config.fuel_api_url.contains("minetur.gob.es"));
    }
}
