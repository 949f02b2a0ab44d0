use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::{Connector, PointWriter, PriceSource};
use crate::domain::{IngestError, PricePoint};

/// Scripted reply for one URL
#[derive(Debug, Clone)]
struct MockReply {
    delay: Duration,
    body: Result<Value, String>,
}

/// Mock price source that records calls and replies per URL after an optional delay
#[derive(Debug, Clone, Default)]
pub struct MockPriceSource {
    calls: Arc<Mutex<Vec<(String, Option<String>, Instant)>>>,
    completed: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to reply with `body` for `url` after `delay`
    pub fn with_response(self, url: &str, body: Value, delay: Duration) -> Self {
        self.replies.lock().unwrap().insert(
            url.to_string(),
            MockReply { delay, body: Ok(body) },
        );
        self
    }

    /// Builder method to fail `url` with a transport error after `delay`
    pub fn with_failure(self, url: &str, message: &str, delay: Duration) -> Self {
        self.replies.lock().unwrap().insert(
            url.to_string(),
            MockReply { delay, body: Err(message.to_string()) },
        );
        self
    }

    /// Recorded (url, api_key) pairs, in call order
    pub fn get_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, key, _)| (url.clone(), key.clone()))
            .collect()
    }

    /// Instants at which `url` was requested
    pub fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| u == url)
            .map(|(_, _, at)| *at)
            .collect()
    }

    /// URLs whose fetch ran to completion (success or failure), in completion order
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch(&self, url: &str, api_key: Option<&str>) -> Result<Value, IngestError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), api_key.map(str::to_string), Instant::now()));

        let reply = self.replies.lock().unwrap().get(url).cloned();
        let Some(reply) = reply else {
            return Err(IngestError::Transport(format!("No response configured for {}", url)));
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        self.completed.lock().unwrap().push(url.to_string());

        reply.body.map_err(IngestError::Transport)
    }
}

/// Mock writer that records every point it accepts
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    points: Arc<Mutex<Vec<PricePoint>>>,
    attempts: Arc<Mutex<usize>>,
    fail_on_attempt: Option<usize>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to reject the n-th write (1-based)
    pub fn failing_on(mut self, attempt: usize) -> Self {
        self.fail_on_attempt = Some(attempt);
        self
    }

    /// Points acknowledged so far
    pub fn get_points(&self) -> Vec<PricePoint> {
        self.points.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl PointWriter for RecordingWriter {
    async fn write_point(&self, point: &PricePoint) -> Result<(), IngestError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };

        if self.fail_on_attempt == Some(attempt) {
            return Err(IngestError::Persistence {
                point: point.to_string(),
                reason: "write not acknowledged".to_string(),
            });
        }

        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }
}

/// Connector handing out clones of shared mocks, counting every open
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub source: MockPriceSource,
    pub writer: RecordingWriter,
    opens: Arc<Mutex<usize>>,
    refuse: bool,
}

impl MockConnector {
    pub fn new(source: MockPriceSource, writer: RecordingWriter) -> Self {
        Self {
            source,
            writer,
            ..Self::default()
        }
    }

    /// Builder method making every `open` fail
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    pub fn opens(&self) -> usize {
        *self.opens.lock().unwrap()
    }
}

impl Connector for MockConnector {
    type Source = MockPriceSource;
    type Sink = RecordingWriter;

    fn open(&self) -> Result<(Self::Source, Self::Sink), IngestError> {
        *self.opens.lock().unwrap() += 1;
        if self.refuse {
            return Err(IngestError::Transport("connector refused".to_string()));
        }
        Ok((self.source.clone(), self.writer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_price_source() {
        let mock = MockPriceSource::new()
            .with_response("http://a", json!({"data": []}), Duration::ZERO);

        let result = mock.fetch("http://a", Some("key")).await.unwrap();
        assert_eq!(result, json!({"data": []}));
        assert_eq!(
            mock.get_calls(),
            vec![("http://a".to_string(), Some("key".to_string()))]
        );

        let missing = mock.fetch("http://b", None).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_recording_writer_failure() {
        let writer = RecordingWriter::new().failing_on(2);
        let point = PricePoint {
            measurement: "BTC".to_string(),
            exchange: "Kraken".to_string(),
            currency: "EUR".to_string(),
            price: 1.0,
        };

        assert!(writer.write_point(&point).await.is_ok());
        assert!(writer.write_point(&point).await.is_err());
        assert_eq!(writer.attempts(), 2);
        assert_eq!(writer.get_points().len(), 1);
    }
}
