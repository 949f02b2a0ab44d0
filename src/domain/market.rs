use std::fmt;
use serde::Deserialize;
use serde_json::Value;

use super::endpoint::EndpointTable;
use super::error::IngestError;

/// Tag holding the exchange display name
pub const EXCHANGE_TAG: &str = "Exchange";
/// Tag holding the quote currency symbol
pub const CURRENCY_TAG: &str = "Currency";
/// Field holding the price
pub const PRICE_FIELD: &str = "Price";

/// One market entry from the upstream `data` array.
/// Fields other than these four are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarketRecord {
    pub exchange_id: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    #[serde(default)]
    pub price_quote: Option<String>,
}

/// A single tagged price measurement, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    /// Measurement name: the base symbol
    pub measurement: String,
    /// Exchange display name
    pub exchange: String,
    /// Quote symbol
    pub currency: String,
    pub price: f64,
}

impl fmt::Display for PricePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}={},{}={} {}={}",
            self.measurement,
            EXCHANGE_TAG,
            self.exchange,
            CURRENCY_TAG,
            self.currency,
            PRICE_FIELD,
            self.price
        )
    }
}

/// Extract the market records of a response body.
///
/// An object without `data` (or with `data: null`) has no records. Any body
/// that is not a JSON object is malformed.
pub fn records_from_body(body: &Value) -> Result<Vec<RawMarketRecord>, IngestError> {
    let Value::Object(fields) = body else {
        return Err(IngestError::MalformedRecord(format!(
            "expected a JSON object, got {}",
            body
        )));
    };

    match fields.get("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => Vec::<RawMarketRecord>::deserialize(data)
            .map_err(|e| IngestError::MalformedRecord(e.to_string())),
    }
}

/// Convert a raw record into a price point
pub fn build_point(record: &RawMarketRecord, endpoints: &EndpointTable) -> Result<PricePoint, IngestError> {
    let exchange = endpoints
        .display_name(&record.exchange_id)
        .ok_or_else(|| IngestError::Lookup(record.exchange_id.clone()))?;

    let price = parse_price(record.price_quote.as_deref())?;

    Ok(PricePoint {
        measurement: record.base_symbol.clone(),
        exchange: exchange.to_string(),
        currency: record.quote_symbol.clone(),
        price,
    })
}

/// Parse a string-encoded decimal into a finite f64
pub fn parse_price(quote: Option<&str>) -> Result<f64, IngestError> {
    let Some(raw) = quote else {
        return Err(IngestError::Parse {
            value: String::new(),
            reason: "priceQuote is missing".to_string(),
        });
    };

    let price = raw.trim().parse::<f64>().map_err(|e| IngestError::Parse {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !price.is_finite() {
        return Err(IngestError::Parse {
            value: raw.to_string(),
            reason: "price is not finite".to_string(),
        });
    }

    Ok(price)
}
