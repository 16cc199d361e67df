use std::path::Path;
use serde::Deserialize;
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// API root the collection path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means the transport's own behavior.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Poll interval of `linkctl watch`
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Config {
    /// Parses and checks a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.gateway.base_url.trim().is_empty() {
            bail!("gateway.base_url must not be empty");
        }
        if config.registry.refresh_interval_secs == 0 {
            bail!("registry.refresh_interval_secs must be at least 1");
        }
        Ok(config)
    }

    /// Reads the file at `path`. A missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
