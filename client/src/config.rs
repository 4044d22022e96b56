//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `HOUSEHOLD_*` environment variables or a configuration
//! file; every key has a default, so an empty environment yields a client
//! pointed at a local backend.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Backend base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5042/api";

const STORAGE_DIR_NAME: &str = "household-client";

fn default_storage_dir() -> PathBuf {
    std::env::temp_dir().join(STORAGE_DIR_NAME)
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `api_base_url` is not an absolute HTTP(S) URL.
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Settings for the household client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOUSEHOLD")]
pub struct ClientSettings {
    /// Backend base URL; every endpoint path is resolved beneath it.
    pub api_base_url: Option<String>,
    /// Directory holding the persisted session.
    pub storage_dir: Option<PathBuf>,
    /// Per-request timeout in seconds. Requests wait indefinitely when unset.
    pub request_timeout_secs: Option<u64>,
    /// Emit JSON log lines instead of the compact human format.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl ClientSettings {
    /// Parsed backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value does not parse
    /// or does not use the `http`/`https` scheme.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .api_base_url
            .as_deref()
            .map_or(DEFAULT_API_BASE_URL, str::trim);
        let invalid = |reason: String| SettingsError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw).map_err(|error| invalid(error.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme `{other}`"))),
        }
    }

    /// Directory for the persisted session, falling back to a folder under
    /// the system temporary directory.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(default_storage_dir)
    }

    /// Configured request timeout, if any. Zero means no timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
