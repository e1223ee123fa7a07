use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `catalog.api_key`.
pub const API_KEY_ENV: &str = "POPCORN_OMDB_API_KEY";

/// Value written by `config init` templates before the user supplies a real key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Query issued as soon as a session starts. Empty means start idle.
    #[serde(default = "default_query")]
    pub default_query: String,
    /// Display title restored whenever no detail view is showing.
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: Option<bool>, // None = decide from whether stdout is a terminal
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_query() -> String {
    "Hannah Montana".to_string()
}

fn default_app_title() -> String {
    "usePopcorn".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            app_title: default_app_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults. Env overrides are applied either way.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.catalog.api_key = api_key;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_catalog_configured() {
            return Err(anyhow::anyhow!(
                "catalog.api_key is not configured (set it in config.toml or {})",
                API_KEY_ENV
            ));
        }

        if self.catalog.timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.timeout_secs must be greater than zero"));
        }

        let base_url = self.catalog.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!("catalog.base_url must be an http(s) URL: {}", base_url));
        }

        Ok(())
    }

    pub fn is_catalog_configured(&self) -> bool {
        let key = self.catalog.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}
