//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - CoinCap: market data REST client
//! - Influx: time-series point writer
//! - CLI: Command-line interface handlers
//! - Connector: per-iteration wiring of the live adapters

pub mod coincap;
pub mod influx;
pub mod cli;
pub mod connector;

pub use coincap::CoinCapClient;
pub use influx::InfluxWriter;
pub use cli::CliApp;
pub use connector::LiveConnector;
