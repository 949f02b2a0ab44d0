//! Endpoint table and fetch task construction
//!
//! An endpoint descriptor names one exchange on the upstream API, the URL
//! template used to query it and the currency pairs to poll there. The table
//! is built once at startup and only read afterwards.

use std::fmt;

/// CoinCap markets endpoint, filled with exchange id, base and quote symbol
pub const COINCAP_MARKETS_URL: &str =
    "https://api.coincap.io/v2/markets?exchangeId={}&baseSymbol={}&quoteSymbol={}";

/// Placeholder token substituted by [`fill_template`]
pub const PLACEHOLDER: &str = "{}";

/// Static description of one exchange and the pairs polled on it
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    /// Upstream exchange identifier (e.g. "gdax")
    pub exchange_id: String,
    /// Human-readable name stored in the `Exchange` tag
    pub name: String,
    /// URL template with three `{}` placeholders
    pub url_template: String,
    pub api_key: Option<String>,
    /// Pairs in "BASE/QUOTE" form
    pub pairs: Vec<String>,
}

/// One request to issue during an iteration
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTask {
    pub exchange_id: String,
    pub pair: String,
    pub url: String,
    pub api_key: Option<String>,
}

impl fmt::Display for FetchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.exchange_id, self.pair)
    }
}

impl EndpointDescriptor {
    pub fn new(
        exchange_id: impl Into<String>,
        name: impl Into<String>,
        url_template: impl Into<String>,
        api_key: Option<String>,
        pairs: Vec<String>,
    ) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            name: name.into(),
            url_template: url_template.into(),
            api_key,
            pairs,
        }
    }

    /// Build one task per well-formed pair. Malformed pairs are skipped.
    pub fn fetch_tasks(&self) -> Vec<FetchTask> {
        self.pairs
            .iter()
            .filter_map(|pair| {
                let Some((base, quote)) = parse_pair(pair) else {
                    tracing::debug!(
                        "Skipping malformed pair {:?} on {}",
                        pair,
                        self.exchange_id
                    );
                    return None;
                };

                let (base, quote) = (base.to_lowercase(), quote.to_lowercase());
                let url = fill_template(
                    &self.url_template,
                    &[self.exchange_id.as_str(), base.as_str(), quote.as_str()],
                );

                Some(FetchTask {
                    exchange_id: self.exchange_id.clone(),
                    pair: pair.clone(),
                    url,
                    api_key: self.api_key.clone(),
                })
            })
            .collect()
    }
}

/// Read-only table of all configured endpoints, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointTable {
    endpoints: Vec<EndpointDescriptor>,
}

impl EndpointTable {
    pub fn new(endpoints: Vec<EndpointDescriptor>) -> Self {
        Self { endpoints }
    }

    /// Built-in table: Coinbase Pro, Bitfinex and Kraken, BTC against EUR and USD
    pub fn coincap_defaults(api_key: Option<String>) -> Self {
        let pairs = || vec!["BTC/EUR".to_string(), "BTC/USD".to_string()];

        Self::new(vec![
            EndpointDescriptor::new("gdax", "Coinbase Pro", COINCAP_MARKETS_URL, api_key.clone(), pairs()),
            EndpointDescriptor::new("bitfinex", "Bitfinex", COINCAP_MARKETS_URL, api_key.clone(), pairs()),
            EndpointDescriptor::new("kraken", "Kraken", COINCAP_MARKETS_URL, api_key, pairs()),
        ])
    }

    pub fn get(&self, exchange_id: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.iter().find(|e| e.exchange_id == exchange_id)
    }

    /// Display name for an exchange id
    pub fn display_name(&self, exchange_id: &str) -> Option<&str> {
        self.get(exchange_id).map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// All tasks for one iteration, across every endpoint
    pub fn fetch_tasks(&self) -> Vec<FetchTask> {
        self.endpoints.iter().flat_map(|e| e.fetch_tasks()).collect()
    }
}

/// Split "BASE/QUOTE" into its two symbols.
///
/// Returns `None` unless there is exactly one separator and both sides are
/// non-empty.
pub fn parse_pair(pair: &str) -> Option<(&str, &str)> {
    let mut parts = pair.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
            Some((base, quote))
        }
        _ => None,
    }
}

/// Substitute each `{}` in `template` with the next argument, in order.
/// Surplus placeholders are left as-is.
pub fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(idx) = rest.find(PLACEHOLDER) {
        let Some(arg) = args.next() else { break };
        out.push_str(&rest[..idx]);
        out.push_str(arg);
        rest = &rest[idx + PLACEHOLDER.len()..];
    }

    out.push_str(rest);
    out
}

/// Number of `{}` placeholders in a URL template
pub fn placeholder_count(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}
