//! Gate configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::net::firestore::DEFAULT_FIRESTORE_BASE_URL;
use crate::net::identity_toolkit::DEFAULT_IDENTITY_BASE_URL;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://auth.tryloop.ai";
pub const DEFAULT_API_BASE_URL: &str = "https://functions.tryloop.ai/auth";
pub const DEFAULT_CURRENT_URL: &str = "http://localhost:5173/";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {message}")]
    InvalidUrl { var: &'static str, message: String },

    #[error("invalid number in {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Firebase project used for the document store and identity lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: String,
    pub firestore_base_url: String,
    pub identity_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub auth_base_url: String,
    pub api_base_url: String,
    pub current_url: String,
    pub redirect_delay: Duration,
    pub state_file: Option<PathBuf>,
    pub firebase: Option<FirebaseConfig>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            current_url: DEFAULT_CURRENT_URL.to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            state_file: None,
            firebase: None,
        }
    }
}

impl GateConfig {
    /// Build typed gate config from environment variables.
    ///
    /// Optional:
    /// - `SESSION_GATE_AUTH_BASE_URL`: login host (default `https://auth.tryloop.ai`)
    /// - `SESSION_GATE_API_BASE_URL`: auth functions base (default `https://functions.tryloop.ai/auth`)
    /// - `SESSION_GATE_CURRENT_URL`: page to return to after login
    /// - `SESSION_GATE_REDIRECT_DELAY_MS`: default 2000
    /// - `SESSION_GATE_STATE_FILE`: path of the long-lived local store
    /// - `FIREBASE_PROJECT_ID` + `FIREBASE_API_KEY`: enable Firestore and identity lookups
    /// - `FIREBASE_FIRESTORE_BASE_URL`, `FIREBASE_IDENTITY_BASE_URL`: endpoint overrides
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable URLs or numbers.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth_base_url = env_url("SESSION_GATE_AUTH_BASE_URL", DEFAULT_AUTH_BASE_URL)?;
        let api_base_url = env_url("SESSION_GATE_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let current_url = std::env::var("SESSION_GATE_CURRENT_URL").unwrap_or_else(|_| DEFAULT_CURRENT_URL.to_string());
        let redirect_delay =
            Duration::from_millis(env_parse_u64("SESSION_GATE_REDIRECT_DELAY_MS", DEFAULT_REDIRECT_DELAY_MS)?);
        let state_file = std::env::var("SESSION_GATE_STATE_FILE").ok().map(PathBuf::from);

        let firebase = match (std::env::var("FIREBASE_PROJECT_ID"), std::env::var("FIREBASE_API_KEY")) {
            (Ok(project_id), Ok(api_key)) => Some(FirebaseConfig {
                project_id,
                api_key,
                firestore_base_url: env_url("FIREBASE_FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL)?,
                identity_base_url: env_url("FIREBASE_IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL)?,
            }),
            _ => None,
        };

        Ok(Self { auth_base_url, api_base_url, current_url, redirect_delay, state_file, firebase })
    }

    /// `{auth_base_url}/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the base does not form a URL.
    pub fn login_endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("{}/login", self.auth_base_url.trim_end_matches('/'))).map_err(|e| {
            ConfigError::InvalidUrl { var: "SESSION_GATE_AUTH_BASE_URL", message: e.to_string() }
        })
    }
}

fn env_url(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    let trimmed = raw.trim_end_matches('/').to_string();
    Url::parse(&trimmed).map_err(|e| ConfigError::InvalidUrl { var: key, message: e.to_string() })?;
    Ok(trimmed)
}

fn env_parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var: key, value: v }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
