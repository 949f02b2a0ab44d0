//! Domain Layer - Core types and logic for BitDelta Vision
//!
//! This module contains pure domain types and logic with no I/O.
//! All external interactions happen through the ports layer.
//!
//! - `endpoint`: Endpoint table, pair parsing and fetch task construction
//! - `market`: Raw market records and price point construction
//! - `error`: Error taxonomy shared by every stage of an iteration

pub mod endpoint;
pub mod market;
pub mod error;

pub use endpoint::{EndpointDescriptor, EndpointTable, FetchTask, parse_pair};
pub use market::{RawMarketRecord, PricePoint, build_point, records_from_body};
pub use error::{IngestError, ErrorKind};
