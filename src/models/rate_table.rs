use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

pub const PIVOT: &str = "USD";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Remote,
    Fallback,
}

/// Units of each currency per 1 USD. Always holds `USD -> 1`.
#[derive(Clone, Debug, Serialize)]
pub struct RateTable {
    rates: HashMap<String, f64>,
    pub updated_at: DateTime<Utc>,
    pub source: RateSource,
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>, source: RateSource) -> Self {
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .filter(|(code, rate)| {
                let ok = rate.is_finite() && *rate > 0.0;
                if !ok {
                    warn!("dropping unusable rate {}={}", code, rate);
                }
                ok
            })
            .collect();
        rates.insert(PIVOT.to_string(), 1.0);
        Self { rates, updated_at: Utc::now(), source }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }
}
