//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, where the session token is kept, and the last email
//! used to log in.
//!
//! Configuration is stored at `~/.config/memorialqr/config.json`. Setting
//! `MEMORIALQR_CONFIG_DIR` moves both the config file and the data
//! directory (session, logs, downloads) under that directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "memorialqr";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config and data directories
pub const CONFIG_DIR_ENV: &str = "MEMORIALQR_CONFIG_DIR";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "MEMORIALQR_API_URL";

/// API used when nothing else is configured (local NestJS dev server)
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub token_backend: TokenBackend,
    pub last_email: Option<String>,
    pub log_to_file: bool,
    pub request_timeout_secs: u64,
    /// Per-run API URL from the environment or the command line; never saved.
    #[serde(skip)]
    api_url_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_backend: TokenBackend::default(),
            last_email: None,
            log_to_file: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_url_override: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent) and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.override_api_url(&url);
        }
        Ok(config)
    }

    /// Use `url` for this run only. Blank values are ignored.
    pub fn override_api_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api_url_override = Some(url.to_string());
        }
    }

    /// The API URL in effect: a per-run override, else the saved one.
    pub fn effective_api_url(&self) -> &str {
        self.api_url_override.as_deref().unwrap_or(&self.api_url)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn override_dir() -> Option<PathBuf> {
        std::env::var_os(CONFIG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = Self::override_dir() {
            return Ok(dir.join(CONFIG_FILE));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file, logs and downloads.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = Self::override_dir() {
            return Ok(dir);
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Build the token store selected by `token_backend`.
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(self.data_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_backend, TokenBackend::File);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_url":"https://qr.example.com/api","token_backend":"keyring"}"#)
                .unwrap();
        assert_eq!(config.api_url, "https://qr.example.com/api");
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(!config.log_to_file);
    }

    #[test]
    fn test_api_url_override_is_not_saved() {
        let mut config = Config::default();
        config.override_api_url("  http://staging.invalid/api ");
        config.override_api_url("   ");
        assert_eq!(config.effective_api_url(), "http://staging.invalid/api");

        let saved = serde_json::to_string(&config).unwrap();
        assert!(!saved.contains("staging"));
        let reloaded: Config = serde_json::from_str(&saved).unwrap();
        assert_eq!(reloaded.effective_api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
