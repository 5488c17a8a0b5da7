// Client configuration
// Loaded once at startup from the platform config directory

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

/// Connection settings for the CRM backend and web dashboard.
///
/// Read from `config.toml` in the platform config directory; every field
/// has a default so a missing file still produces a usable local setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the CRM REST API
    pub api_base_url: String,
    /// Base URL of the web dashboard, used for conflict deep links
    pub web_base_url: String,
    /// Bearer token attached to every request
    pub api_token: Option<String>,
    /// Tenant sent via the X-Tenant-ID header
    pub tenant_id: Option<String>,
    /// Overrides the backend's default location when set
    pub location_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            web_base_url: "http://127.0.0.1:3000".to_string(),
            api_token: None,
            tenant_id: None,
            location_id: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults when no
    /// config file exists yet.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            log::warn!("No platform config directory available, using default configuration");
            return Ok(Self::default());
        };

        if !path.exists() {
            log::info!("No config file at {:?}, using default configuration", path);
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "salon-calendar")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
