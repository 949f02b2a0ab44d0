//! Configuration Loader
//!
//! Credentials come from a key-value env file (falling back to the process
//! environment). The endpoint table is either the built-in CoinCap table or a
//! TOML file describing exchanges and pairs.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::endpoint::{placeholder_count, COINCAP_MARKETS_URL};
use crate::domain::{EndpointDescriptor, EndpointTable};

/// Default env file read at startup
pub const DEFAULT_ENV_FILE: &str = "bitdeltavision.env";

/// Default pause between poll iterations
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub const COINCAP_API_KEY: &str = "COINCAP_API_KEY";
pub const INFLUXDB_URL: &str = "INFLUXDB_URL";
pub const INFLUXDB_TOKEN: &str = "INFLUXDB_TOKEN";
pub const INFLUXDB_ORG: &str = "INFLUXDB_ORG";
pub const INFLUXDB_BUCKET: &str = "INFLUXDB_BUCKET";

/// Secrets and connection parameters. Absent keys are `None` and are not
/// validated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub coincap_api_key: Option<String>,
    pub influxdb_url: Option<String>,
    pub influxdb_token: Option<String>,
    pub influxdb_org: Option<String>,
    pub influxdb_bucket: Option<String>,
}

impl Credentials {
    /// Read credentials from `path`. A missing file yields no file values.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let values = if path.exists() {
            dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?
        } else {
            tracing::warn!("Env file {} not found, using process environment only", path.display());
            HashMap::new()
        };

        Ok(Self::from_values(&values))
    }

    /// Resolve each key from `values`, then from the process environment
    pub fn from_values(values: &HashMap<String, String>) -> Self {
        Self::resolve(values, |key| std::env::var(key).ok())
    }

    /// Resolve each key from `values`, then from `fallback`
    fn resolve<F>(values: &HashMap<String, String>, fallback: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| values.get(key).cloned().or_else(|| fallback(key));

        Self {
            coincap_api_key: get(COINCAP_API_KEY),
            influxdb_url: get(INFLUXDB_URL),
            influxdb_token: get(INFLUXDB_TOKEN),
            influxdb_org: get(INFLUXDB_ORG),
            influxdb_bucket: get(INFLUXDB_BUCKET),
        }
    }
}

/// Endpoints file structure
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsFile {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub exchanges: Vec<ExchangeSection>,
}

/// One `[[exchanges]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSection {
    /// Upstream exchange id (e.g. "gdax")
    pub id: String,
    /// Display name written in the Exchange tag
    pub name: String,
    /// URL template; defaults to the CoinCap markets endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub pairs: Vec<String>,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Fully resolved runtime settings, immutable after startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub endpoints: EndpointTable,
    pub poll_interval: Duration,
}

impl Settings {
    /// Built-in endpoint table with the default interval
    pub fn with_defaults(credentials: Credentials) -> Self {
        let endpoints = EndpointTable::coincap_defaults(credentials.coincap_api_key.clone());
        Self {
            credentials,
            endpoints,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse env file: {0}")]
    EnvError(#[from] dotenvy::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load settings: credentials from `env_file`, endpoints from `endpoints_file`
/// or the built-in table when none is given
pub fn load_settings<P: AsRef<Path>>(
    env_file: P,
    endpoints_file: Option<&Path>,
) -> Result<Settings, ConfigError> {
    let credentials = Credentials::from_env_file(env_file)?;

    match endpoints_file {
        Some(path) => load_endpoints(path, credentials),
        None => Ok(Settings::with_defaults(credentials)),
    }
}

/// Load an endpoints TOML file; every exchange uses the CoinCap API key
pub fn load_endpoints<P: AsRef<Path>>(path: P, credentials: Credentials) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: EndpointsFile = toml::from_str(&content)?;
    file.validate()?;

    let api_key = credentials.coincap_api_key.clone();
    let endpoints = EndpointTable::new(
        file.exchanges
            .into_iter()
            .map(|ex| {
                EndpointDescriptor::new(
                    ex.id,
                    ex.name,
                    ex.base_url.unwrap_or_else(|| COINCAP_MARKETS_URL.to_string()),
                    api_key.clone(),
                    ex.pairs,
                )
            })
            .collect(),
    );

    Ok(Settings {
        credentials,
        endpoints,
        poll_interval: Duration::from_secs(file.poll_interval_secs),
    })
}

impl EndpointsFile {
    /// Validate the endpoint table. Pair syntax is left to task construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.exchanges.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[exchanges]] entry is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for ex in &self.exchanges {
            if ex.id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "exchange id cannot be empty".to_string(),
                ));
            }

            if !seen.insert(ex.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate exchange id: {}",
                    ex.id
                )));
            }

            if ex.name.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "name cannot be empty for exchange {}",
                    ex.id
                )));
            }

            if let Some(ref url) = ex.base_url {
                let count = placeholder_count(url);
                if count != 3 {
                    return Err(ConfigError::ValidationError(format!(
                        "base_url for {} must contain 3 placeholders, got {}",
                        ex.id, count
                    )));
                }
            }
        }

        Ok(())
    }
}
