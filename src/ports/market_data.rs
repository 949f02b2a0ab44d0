//! Market data port
//!
//! Source of raw market data: one HTTP GET per fetch task, returning the
//! decoded JSON body.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::IngestError;

/// Market data source trait
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch `url`, authenticating with `api_key` when one is given.
    /// Returns the decoded JSON body unmodified.
    async fn fetch(&self, url: &str, api_key: Option<&str>) -> Result<Value, IngestError>;
}

