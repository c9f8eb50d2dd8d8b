//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `VEXA_API_BASE_URL` - Base URL of the REST API
//!   (default: `http://localhost:5000/api/v1`)
//! - `VEXA_STORAGE_DIR` - Directory for locally persisted state
//!   (default: `.vexa`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default API base path, fixed at build time like the original deployment.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/v1";

const DEFAULT_STORAGE_DIR: &str = ".vexa";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, including the versioned path prefix.
    pub api_base_url: Url,
    /// Directory where the credential token and cart are persisted.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `VEXA_API_BASE_URL` is set but is not a
    /// valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("VEXA_API_BASE_URL", DEFAULT_API_BASE_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VEXA_API_BASE_URL".to_string(), e.to_string())
            })?;
        let storage_dir = PathBuf::from(get_env_or_default("VEXA_STORAGE_DIR", DEFAULT_STORAGE_DIR));

        Ok(Self {
            api_base_url,
            storage_dir,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_parses() {
        let url = DEFAULT_API_BASE_URL.parse::<Url>().unwrap();
        assert_eq!(url.path(), "/api/v1");
    }

    #[test]
    fn test_manual_construction() {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9/api/v1".parse().unwrap(),
            storage_dir: PathBuf::from("/tmp/vexa-test"),
        };
        assert_eq!(config.api_base_url.port(), Some(9));
    }
}
