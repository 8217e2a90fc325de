use anyhow::Result;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8112/";
pub const DEFAULT_RPC_PATH: &str = "/json";
pub const DEFAULT_PASSWORD: &str = "deluge";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Connection settings for a Deluge Web UI.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DelugeConfig {
    /// Web UI root, e.g. `http://localhost:8112/`
    pub base_url: String,
    /// JSON-RPC path below `base_url`
    pub path: String,
    pub password: String,
    /// Per request timeout, handed to the HTTP client unchanged
    pub timeout_ms: u64,
    /// Optional proxy url applied to every request
    pub proxy: Option<String>,
}

impl DelugeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DelugeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path: DEFAULT_RPC_PATH.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            proxy: None,
        }
    }
}

impl fmt::Debug for DelugeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the password.
        f.debug_struct("DelugeConfig")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("proxy", &self.proxy)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deluge: DelugeConfig,
}

impl Config {
    /// Loads `config.toml` from the current directory.
    pub fn new() -> Result<Self> {
        Self::from_path("config.toml")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&config_str)?;
        info!("Config: {:?}", config);
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}
