//! Storage port
//!
//! Sink for price points. Writes are one point at a time; an error means the
//! point was not acknowledged by the database.

use async_trait::async_trait;

use crate::domain::{IngestError, PricePoint};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointWriter: Send + Sync {
    /// Persist a single point, timestamped at write time
    async fn write_point(&self, point: &PricePoint) -> Result<(), IngestError>;
}

