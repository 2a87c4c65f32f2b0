//! Application configuration management.
//!
//! Configuration is stored at `~/.config/satchi/config.json` and holds the
//! backend base URL, the authorization scheme, the institutional email
//! domain and the last email used to log in. Environment variables
//! override the file for the API URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "satchi";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default backend location (the Django dev server)
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Institutional domain accepted for accounts and role assignments
pub const DEFAULT_EMAIL_DOMAIN: &str = "amrita.edu";

/// Environment variable that overrides `api_base_url`
const API_URL_ENV: &str = "SATCHI_API_URL";

/// Prefix used in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Token <key>` (Django REST framework token auth)
    #[default]
    Token,
    /// `Authorization: Bearer <jwt>`
    Bearer,
}

impl AuthScheme {
    pub fn prefix(&self) -> &'static str {
        match self {
            AuthScheme::Token => "Token",
            AuthScheme::Bearer => "Bearer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    #[serde(default)]
    pub last_email: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_email_domain() -> String {
    DEFAULT_EMAIL_DOMAIN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_scheme: AuthScheme::default(),
            email_domain: default_email_domain(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_email": "a@amrita.edu"}"#).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.auth_scheme, AuthScheme::Token);
        assert_eq!(config.email_domain, "amrita.edu");
        assert_eq!(config.last_email.as_deref(), Some("a@amrita.edu"));
    }

    #[test]
    fn test_auth_scheme_prefix() {
        let config: Config = serde_json::from_str(r#"{"auth_scheme": "bearer"}"#).unwrap();
        assert_eq!(config.auth_scheme.prefix(), "Bearer");
        assert_eq!(AuthScheme::Token.prefix(), "Token");
    }
}
