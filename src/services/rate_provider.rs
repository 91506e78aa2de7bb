use reqwest::Client;
use std::collections::HashMap;

use crate::models::rate_table::{RateSource, RateTable};
use crate::types::external::ErLatest;
use crate::utils::error::RateError;

/// Fetches the latest USD-based rates. A non-2xx status, an undecodable
/// body, or a body whose `result` is not `success` all fail.
pub async fn load(http: &Client, url: &str) -> Result<RateTable, RateError> {
    let body: ErLatest = http
        .get(url)
        .send()
        .await
        .map_err(|e| RateError::Network(format!("could not reach rates api: {}", e)))?
        .error_for_status()
        .map_err(|e| RateError::Network(format!("HTTP error! status: {}", e.status().map(|s| s.as_u16()).unwrap_or_default())))?
        .json()
        .await
        .map_err(|e| RateError::Decode(format!("could not parse rates: {}", e)))?;

    if body.result != "success" {
        return Err(RateError::Api(body.error_type.unwrap_or_else(|| "API Error".into())));
    }

    match body.conversion_rates {
        Some(rates) if !rates.is_empty() => Ok(RateTable::new(rates, RateSource::Remote)),
        _ => Err(RateError::Decode("response carried no conversion_rates".into())),
    }
}

/// Approximate static rates used when the remote source is unavailable.
pub fn fallback() -> RateTable {
    let rates: HashMap<String, f64> = [
        ("USD", 1.0),
        ("EUR", 0.85),
        ("GBP", 0.73),
        ("JPY", 110.0),
        ("AUD", 1.35),
        ("CAD", 1.25),
        ("CHF", 0.92),
        ("CNY", 6.45),
        ("SEK", 8.85),
        ("NZD", 1.42),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect();

    RateTable::new(rates, RateSource::Fallback)
}
