//! Environment configuration
//!
//! The active environment is picked by the `ENV` variable (default `test`)
//! and read from `<configs_dir>/<env>.json`. A missing file is fatal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Variable that selects the environment file
pub const ENV_VAR: &str = "ENV";

/// Environment used when `ENV` is unset
pub const DEFAULT_ENV: &str = "test";

/// Configuration of one target environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    /// Storefront root, e.g. `https://www.saucedemo.com`
    pub base_url: String,

    /// Credentials and API settings
    pub env: EnvSection,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSection {
    pub login: Credentials,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// REST API settings.
///
/// Accepts either a bare base URL string or a full object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ApiConfigRepr")]
pub struct ApiConfig {
    pub url: String,

    /// Headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiConfigRepr {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

impl From<ApiConfigRepr> for ApiConfig {
    fn from(repr: ApiConfigRepr) -> Self {
        match repr {
            ApiConfigRepr::Url(url) => Self {
                url,
                headers: BTreeMap::new(),
            },
            ApiConfigRepr::Full { url, headers } => Self { url, headers },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeouts {
    /// Navigation / page load bound
    pub page_load_ms: u64,

    /// How long an expectation keeps polling before it fails
    pub expect_ms: u64,

    /// Poll interval for expectations
    pub poll_ms: u64,

    /// Maximum accepted API response latency
    pub api_latency_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load_ms: 5000,
            expect_ms: 5000,
            poll_ms: 100,
            api_latency_ms: 500,
        }
    }
}

impl Timeouts {
    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn expect(&self) -> Duration {
        Duration::from_millis(self.expect_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn api_latency(&self) -> Duration {
        Duration::from_millis(self.api_latency_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
        }
    }
}

impl EnvConfig {
    /// Load the environment named by `ENV` (or `test`) from `configs_dir`
    pub fn load(configs_dir: &Path) -> Result<Self> {
        let name = active_env_name();
        Self::load_named(configs_dir, &name)
    }

    /// Load `<configs_dir>/<name>.json`
    pub fn load_named(configs_dir: &Path, name: &str) -> Result<Self> {
        let path = config_path(configs_dir, name);
        if !path.exists() {
            return Err(Error::ConfigNotFound(path));
        }

        debug!("Reading environment config: {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_json(&content)?;

        info!("Environment '{}' -> {}", name, config.base_url);
        Ok(config)
    }

    /// Parse and validate a config document
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate()?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.env.api.url = config.env.api.url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("baseUrl is empty".to_string()));
        }
        if self.env.api.url.trim().is_empty() {
            return Err(Error::InvalidConfig("env.api url is empty".to_string()));
        }
        if self.timeouts.poll_ms == 0 {
            return Err(Error::InvalidConfig("timeouts.pollMs must be > 0".to_string()));
        }
        Ok(())
    }

    /// Absolute storefront URL for a route fragment
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Name of the active environment
pub fn active_env_name() -> String {
    std::env::var(ENV_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Path of the config file for an environment
pub fn config_path(configs_dir: &Path, name: &str) -> PathBuf {
    configs_dir.join(format!("{}.json", name))
}
