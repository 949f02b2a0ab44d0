//! Live Connector
//!
//! Opens a fresh CoinCap client and InfluxDB writer for every iteration.

use crate::config::Credentials;
use crate::domain::IngestError;
use crate::ports::Connector;

use super::coincap::CoinCapClient;
use super::influx::InfluxWriter;

#[derive(Debug, Clone)]
pub struct LiveConnector {
    credentials: Credentials,
}

impl LiveConnector {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl Connector for LiveConnector {
    type Source = CoinCapClient;
    type Sink = InfluxWriter;

    fn open(&self) -> Result<(Self::Source, Self::Sink), IngestError> {
        let source = CoinCapClient::new()?;
        let sink = InfluxWriter::from_credentials(&self.credentials);
        Ok((source, sink))
    }
}
