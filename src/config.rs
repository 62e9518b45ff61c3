//! Client configuration
//!
//! Stored as TOML at `~/.config/miskatonic/config.toml`. A missing file means
//! defaults; the `--env` flag overrides the stored environment for one run.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const PROD_SERVER_URL: &str = "https://miskatonic-book-manager-server.herokuapp.com";
pub const DEV_SERVER_URL: &str = "http://localhost:5100";

const CONFIG_FILE: &str = "config.toml";

/// Which backend the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

impl Default for Environment {
    /// Packaged (release) builds talk to production, local builds to the dev server
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

impl Environment {
    pub fn server_url(&self) -> &'static str {
        match self {
            Environment::Production => PROD_SERVER_URL,
            Environment::Development => DEV_SERVER_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

/// Color theme selection for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuiTheme {
    #[default]
    CatppuccinMocha,
    CatppuccinLatte,
    Nord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default)]
    pub theme: TuiTheme,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_history_capacity() -> usize {
    32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Overrides the environment's base URL when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Number of previously focused items remembered by the focus state
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub tui: TuiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            server_url: None,
            request_timeout_secs: default_timeout_secs(),
            history_capacity: default_history_capacity(),
            tui: TuiConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("miskatonic"))
            .context("Could not determine config directory")
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE))
    }

    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Base URL requests are sent to
    pub fn server_url(&self) -> &str {
        self.server_url
            .as_deref()
            .unwrap_or_else(|| self.environment.server_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.history_capacity, 32);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.environment = Environment::Production;
        config.tui.theme = TuiTheme::Nord;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.environment, Environment::Production);
        assert_eq!(loaded.tui.theme, TuiTheme::Nord);
    }

    #[test]
    fn test_server_url_selection() {
        let mut config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        assert_eq!(config.server_url(), PROD_SERVER_URL);

        config.environment = Environment::Development;
        assert_eq!(config.server_url(), DEV_SERVER_URL);

        config.server_url = Some("http://books.internal:8080".into());
        assert_eq!(config.server_url(), "http://books.internal:8080");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "environment = \"development\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.tui.theme, TuiTheme::CatppuccinMocha);
    }
}
