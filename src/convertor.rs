//! Client for the currency conversion API.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::currency::{ConversionRequest, Currency};

pub struct CurrencyConvertor {
    api_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl CurrencyConvertor {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(api_url, api_key, builder.build()?))
    }

    pub fn with_client(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            http,
        }
    }

    /// Convert `amount` of `base` into `quote` at the current upstream rate.
    ///
    /// Returns the converted amount as a string, e.g. `"7070.0"` or `"7.07e-05"`.
    /// Input is validated before any request is made.
    pub async fn get_price(
        &self,
        base: &str,
        quote: &str,
        amount: &str,
    ) -> Result<String, ConvertError> {
        let request = ConversionRequest::parse(base, quote, amount)?;
        let rate = self.fetch_rate(&request).await?;
        let converted = rate * request.amount;
        info!(
            "💱 {} {} -> {} at rate {rate}",
            request.amount, request.base, request.quote
        );
        Ok(format_amount(converted))
    }

    async fn fetch_rate(&self, request: &ConversionRequest) -> Result<f64, ConvertError> {
        let pair = request.pair_key();
        debug!("Requesting rate for {pair} from {}", self.api_url);

        let response = self
            .http
            .get(&self.api_url)
            .query(&[("apiKey", self.api_key.as_str()), ("q", pair.as_str())])
            .send()
            .await
            .map_err(|e| ConvertError::ConnectionFailure {
                endpoint: self.api_url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ConvertError::UpstreamError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ConvertError::ConnectionFailure {
                endpoint: self.api_url.clone(),
                source: e,
            })?;

        extract_rate(&body, &pair)
    }
}

#[derive(Deserialize)]
struct RateResponse {
    #[serde(default)]
    results: HashMap<String, PairRate>,
}

#[derive(Deserialize)]
struct PairRate {
    val: Option<RateValue>,
}

/// The API has served the rate both as a JSON string and as a JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

/// Pull `results[pair].val` out of a response body.
fn extract_rate(body: &str, pair: &str) -> Result<f64, ConvertError> {
    let response: RateResponse = serde_json::from_str(body).map_err(|_| {
        ConvertError::MalformedUpstreamResponse {
            raw: truncate(body, 200).to_string(),
        }
    })?;

    match response.results.get(pair).and_then(|p| p.val.as_ref()) {
        Some(RateValue::Number(n)) => Ok(*n),
        Some(RateValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConvertError::MalformedUpstreamResponse { raw: s.clone() }),
        None => Err(ConvertError::MalformedUpstreamResponse {
            raw: "null".to_string(),
        }),
    }
}

/// Shortest round-trip form that keeps a fractional part: `7070.0`, `106.05000000000001`.
/// Magnitudes below 1e-4 or from 1e16 up use an exponent with an explicit sign
/// and at least two digits: `7.07e-05`, `1e+16`.
fn format_amount(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => match exp.strip_prefix('-') {
                Some(digits) => format!("{mantissa}e-{digits:0>2}"),
                None => format!("{mantissa}e+{exp:0>2}"),
            },
            None => formatted,
        };
    }

    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug)]
pub enum ConvertError {
    /// Base or quote is not in the allow-list.
    InvalidCurrency { code: String },
    /// Amount could not be read as a number.
    InvalidAmount(String),
    /// The request never got a response.
    ConnectionFailure {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Non-200 status from the API.
    UpstreamError(u16),
    /// 200 response whose rate could not be read.
    MalformedUpstreamResponse { raw: String },
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::InvalidCurrency { code } => write!(
                f,
                "Currency '{code}' is not in available currencies: {}",
                Currency::allowed_list()
            ),
            ConvertError::InvalidAmount(amount) => write!(
                f,
                "Amount must be a number (integer or float) but not '{amount}'"
            ),
            ConvertError::ConnectionFailure { endpoint, .. } => {
                write!(f, "Connection error to {endpoint}")
            }
            ConvertError::UpstreamError(status) => {
                write!(f, "Something wrong, API response code is {status}")
            }
            ConvertError::MalformedUpstreamResponse { raw } => write!(
                f,
                "Something wrong, in API response wrong or empty value: \"{raw}\""
            ),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::ConnectionFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}
