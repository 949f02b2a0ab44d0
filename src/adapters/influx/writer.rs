use async_trait::async_trait;
use chrono::{DateTime, Utc};
use influxdb::{Client, Timestamp, WriteQuery};

use crate::config::Credentials;
use crate::domain::market::{CURRENCY_TAG, EXCHANGE_TAG, PRICE_FIELD};
use crate::domain::{IngestError, PricePoint};
use crate::ports::PointWriter;

/// Writes price points to an InfluxDB bucket
#[derive(Debug, Clone)]
pub struct InfluxWriter {
    client: Client,
}

impl InfluxWriter {
    /// An empty token is treated as no token.
    pub fn new(url: &str, bucket: &str, token: Option<&str>) -> Self {
        let mut client = Client::new(url, bucket);
        if let Some(token) = auth_token(token) {
            client = client.with_token(token);
        }
        Self { client }
    }

    /// Build a writer from loaded credentials.
    ///
    /// Missing values are passed through as empty strings; a missing URL
    /// shows up as a failed write rather than a configuration error.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.influxdb_url.as_deref().unwrap_or_default(),
            credentials.influxdb_bucket.as_deref().unwrap_or_default(),
            credentials.influxdb_token.as_deref(),
        )
    }
}

fn auth_token(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

/// Line-protocol query for one point at second precision
pub fn point_query(point: &PricePoint, at: DateTime<Utc>) -> WriteQuery {
    let seconds = at.timestamp().max(0) as u128;

    WriteQuery::new(Timestamp::Seconds(seconds), point.measurement.as_str())
        .add_tag(EXCHANGE_TAG, point.exchange.clone())
        .add_tag(CURRENCY_TAG, point.currency.clone())
        .add_field(PRICE_FIELD, point.price)
}

/// Map the database reply for `point` onto the write contract
pub fn ensure_acknowledged(
    ack: Result<String, influxdb::Error>,
    point: &PricePoint,
) -> Result<(), IngestError> {
    ack.map(|_| ()).map_err(|e| IngestError::Persistence {
        point: point.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl PointWriter for InfluxWriter {
    async fn write_point(&self, point: &PricePoint) -> Result<(), IngestError> {
        let query = point_query(point, Utc::now());
        let ack = self.client.query(query).await;

        ensure_acknowledged(ack, point)?;
        tracing::debug!("Wrote {}", point);
        Ok(())
    }
}
