mod integration;

use std::collections::HashMap;

use crate::models::rate_table::{RateSource, RateTable};

pub(crate) fn sample_table() -> RateTable {
    let rates: HashMap<String, f64> = [("USD", 1.0), ("EUR", 0.85), ("GBP", 0.73), ("JPY", 110.0)]
        .into_iter()
        .map(|(c, r)| (c.to_string(), r))
        .collect();
    RateTable::new(rates, RateSource::Remote)
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
