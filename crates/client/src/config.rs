//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_BASE_URL` - Base URL of the remote storefront API
//!
//! ## Optional
//! - `STOREFRONT_BEARER_TOKEN` - Bearer credential for authenticated calls
//! - `STOREFRONT_STATE_PATH` - Path of the JSON state file; state stays
//!   in memory when unset

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the bearer credential.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the remote storefront API.
    pub api_base_url: Url,
    /// Bearer credential attached to requests when present.
    pub bearer_token: Option<SecretString>,
    /// JSON state file for session identity and cart persistence.
    pub state_path: Option<PathBuf>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("state_path", &self.state_path)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw_url = lookup("STOREFRONT_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_API_BASE_URL".into()))?;
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_BASE_URL".into(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_API_BASE_URL".into(),
                "must be an absolute http(s) URL".into(),
            ));
        }

        let bearer_token = lookup("STOREFRONT_BEARER_TOKEN")
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        let state_path = lookup("STOREFRONT_STATE_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_base_url,
            bearer_token,
            state_path,
        })
    }
}
