//! CoinCap API Client
//!
//! HTTP client for the CoinCap markets endpoint.
//! One GET per fetch task; the bearer token is only attached when a key is set.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::IngestError;
use crate::ports::PriceSource;

const JSON_CONTENT_TYPE: &str = "application/json";

/// CoinCap REST client
#[derive(Debug, Clone)]
pub struct CoinCapClient {
    http: Client,
}

impl CoinCapClient {
    /// Create a new client with the HTTP client's default timeouts
    pub fn new() -> Result<Self, IngestError> {
        let http = Client::builder()
            .build()
            .map_err(|e| IngestError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    /// Create a client on top of an existing HTTP client
    pub fn with_http(http: Client) -> Self {
        Self { http }
    }

    /// GET `url` and decode its JSON body
    pub async fn fetch_json(&self, url: &str, api_key: Option<&str>) -> Result<Value, IngestError> {
        let mut req = self.http.get(url);

        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            req = req.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = req.send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            return Err(IngestError::Transport(format!(
                "Response status is not 200. Status: {}.",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await?;

        decode_body(content_type.as_deref(), &body)
    }
}

/// Check the content type of a 200 response and decode its body
pub fn decode_body(content_type: Option<&str>, body: &str) -> Result<Value, IngestError> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
        .unwrap_or(false);

    if !is_json {
        return Err(IngestError::Transport(format!(
            "Response Content-Type does not match. Expected: {}. Received: {}. Response: {}.",
            JSON_CONTENT_TYPE,
            content_type.unwrap_or("<none>"),
            body
        )));
    }

    serde_json::from_str(body)
        .map_err(|e| IngestError::Transport(format!("Failed to decode JSON body: {}", e)))
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IngestError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            IngestError::Transport(format!("Connection failed: {}", err))
        } else {
            IngestError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl PriceSource for CoinCapClient {
    async fn fetch(&self, url: &str, api_key: Option<&str>) -> Result<Value, IngestError> {
        self.fetch_json(url, api_key).await
    }
}
