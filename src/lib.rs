//! BitDelta Vision - Crypto price ingestion library
//!
//! Polls the CoinCap markets API for a fixed set of exchanges and currency
//! pairs and writes every observed price to InfluxDB.
//!
//! # Modules
//!
//! - `domain`: Endpoint table, market records, price points, errors
//! - `ports`: Trait abstractions (PriceSource, PointWriter, Connector)
//! - `adapters`: External implementations (CoinCap, InfluxDB, CLI)
//! - `config`: Credential and endpoint loading
//! - `application`: The fixed-interval poll loop

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
