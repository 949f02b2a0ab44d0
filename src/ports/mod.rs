//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data fetches (upstream REST API)
//! - Point storage (time-series database)
//! - Per-iteration connection setup

pub mod market_data;
pub mod storage;

#[cfg(test)]
pub mod mocks;

pub use market_data::PriceSource;
pub use storage::PointWriter;

use crate::domain::IngestError;

/// Opens the connections used by one poll iteration.
///
/// Both handles live for a single iteration and are dropped before the loop
/// sleeps, so nothing is shared across iterations.
pub trait Connector: Send + Sync {
    type Source: PriceSource;
    type Sink: PointWriter;

    fn open(&self) -> Result<(Self::Source, Self::Sink), IngestError>;
}
