use serde::Deserialize;
use std::collections::HashMap;

/// Body of `GET {base}/{key}/latest/USD`.
#[derive(Deserialize)]
pub struct ErLatest {
    pub result: String,
    #[serde(default)]
    pub conversion_rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type", default)]
    pub error_type: Option<String>,
}
