use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { amount, from: from.into(), to: to.into() }
    }

    pub fn swapped(&self) -> Self {
        Self { amount: self.amount, from: self.to.clone(), to: self.from.clone() }
    }
}

/// `implied_rate` reads as "1 `from` = `implied_rate` `to`".
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConversionResult {
    pub converted_amount: f64,
    pub implied_rate: f64,
}

/// What a front end renders after a conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionView {
    pub amount: String,
    pub currency: String,
    pub display: String,
    pub rate: String,
    pub last_updated: String,
}
