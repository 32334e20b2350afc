//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Gemini's OpenAI-compatible endpoint, used when only a Gemini key is configured.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Model name and sampling temperature for one kind of provider request.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub provider_base_url: Option<String>,
    pub plan_model: ModelSettings,
    pub alternatives_model: ModelSettings,
    pub provider_timeout: Duration,
    /// Optional JSON file with the unit system and both profiles.
    pub settings_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");

        // --- Load API Keys (as optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty());
        let provider_base_url = lookup("PROVIDER_BASE_URL").filter(|u| !u.is_empty());

        // --- Load Provider Settings ---
        let plan_model = ModelSettings {
            model: var_or("PLAN_MODEL", "gemini-2.5-pro"),
            temperature: 0.7,
        };
        let alternatives_model = ModelSettings {
            model: var_or("ALTERNATIVES_MODEL", "gemini-2.5-flash"),
            temperature: 0.8,
        };

        let timeout_str = var_or("PROVIDER_TIMEOUT_SECS", "120");
        let provider_timeout = match timeout_str.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "PROVIDER_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                ))
            }
        };

        let settings_path = lookup("SETTINGS_PATH").map(PathBuf::from);

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            openai_api_key,
            gemini_api_key,
            provider_base_url,
            plan_model,
            alternatives_model,
            provider_timeout,
            settings_path,
        })
    }

    /// The API key and base URL the provider client should use.
    ///
    /// A Gemini key wins over an OpenAI key and defaults the base URL to Gemini's
    /// OpenAI-compatible endpoint.
    pub fn provider_endpoint(&self) -> Result<(String, Option<String>), ConfigError> {
        if let Some(key) = &self.gemini_api_key {
            let base = self
                .provider_base_url
                .clone()
                .unwrap_or_else(|| GEMINI_OPENAI_BASE_URL.to_string());
            return Ok((key.clone(), Some(base)));
        }
        if let Some(key) = &self.openai_api_key {
            return Ok((key.clone(), self.provider_base_url.clone()));
        }
        Err(ConfigError::MissingVar(
            "GEMINI_API_KEY or OPENAI_API_KEY".to_string(),
        ))
    }
}
