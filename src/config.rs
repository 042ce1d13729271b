use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::catalog::client::{CatalogConfig, DEFAULT_MAX_CONNECTIONS, DEFAULT_TIMEOUT_SECS};

/// Root configuration structure, deserialized from `.license-catalog/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Where the license API lives and how it is called.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// API root; endpoint paths are appended to it.
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// License class identifiers never offered to users.
    #[serde(default = "default_excluded_licenses")]
    pub excluded_licenses: Vec<String>,
    /// Maximum number of requests in flight.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_root_url() -> String {
    "https://api.creativecommons.org/rest/1.5".to_string()
}

fn default_excluded_licenses() -> Vec<String> {
    vec!["recombo".to_string(), "mark".to_string()]
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            root_url: default_root_url(),
            excluded_licenses: default_excluded_licenses(),
            max_connections: default_max_connections(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Build the client settings, validating the root URL.
    pub fn catalog_config(&self) -> Result<CatalogConfig> {
        let root_url = Url::parse(&self.api.root_url)
            .with_context(|| format!("invalid api.root_url `{}`", self.api.root_url))?;

        Ok(CatalogConfig {
            root_url,
            excluded_licenses: self.api.excluded_licenses.iter().cloned().collect(),
            max_connections: self.api.max_connections,
            timeout: Duration::from_secs(self.api.timeout_secs),
        })
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<working_dir>/.license-catalog/config.toml`
/// 3. `~/.config/license-catalog/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = working_dir.join(".license-catalog").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-catalog")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
