use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".srcgraph.toml";

/// Default API root when neither the config file nor the environment names one.
pub const DEFAULT_API_URL: &str = "https://sourcegraph.com/.api/";

pub const ENDPOINT_ENV: &str = "SRC_ENDPOINT";
pub const TOKEN_ENV: &str = "SRC_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .srcgraph.toml.
/// All fields are optional; the client works with zero config against the
/// public endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// API root URL, e.g. `https://sourcegraph.example.com/.api/`
    pub url: Option<String>,

    /// Access token sent as a bearer token.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from .srcgraph.toml in the current directory,
    /// falling back to defaults if the file doesn't exist. `SRC_ENDPOINT`
    /// and `SRC_ACCESS_TOKEN` fill in whatever the file leaves unset.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.api.url.is_none() {
            config.api.url = std::env::var(ENDPOINT_ENV).ok();
        }
        if config.api.token.is_none() {
            config.api.token = std::env::var(TOKEN_ENV).ok();
        }

        Ok(config)
    }

    /// Load from a specific path (no environment fallback).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// The API root URL, or the public endpoint.
    pub fn api_url(&self) -> String {
        self.api
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn access_token(&self) -> Option<String> {
        self.api.token.clone().filter(|token| !token.is_empty())
    }
}
