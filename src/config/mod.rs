//! Configuration Module
//!
//! Loads credentials from the env file and the endpoint table from TOML.

pub mod loader;

pub use loader::{
    Credentials, Settings, ConfigError, load_settings, load_endpoints,
    DEFAULT_ENV_FILE, DEFAULT_POLL_INTERVAL_SECS,
};
