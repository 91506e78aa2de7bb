use crate::models::conversion::{ConversionRequest, ConversionResult};
use crate::models::rate_table::{RateTable, PIVOT};
use crate::utils::error::ConvertError;

/// Converts through the USD pivot. Rates are units per 1 USD, so a USD
/// source multiplies, a USD target divides, and any other pair does both.
pub fn convert(
    req: &ConversionRequest,
    table: Option<&RateTable>,
) -> Result<ConversionResult, ConvertError> {
    let table = table.ok_or(ConvertError::RatesUnavailable)?;
    if req.amount < 0.0 {
        return Err(ConvertError::NegativeAmount);
    }

    let converted_amount = pivot(req.amount, &req.from, &req.to, table)?;
    let implied_rate = pivot(1.0, &req.from, &req.to, table)?;

    Ok(ConversionResult { converted_amount, implied_rate })
}

fn pivot(amount: f64, from: &str, to: &str, table: &RateTable) -> Result<f64, ConvertError> {
    let rate = |code: &str| table.get(code).ok_or_else(|| ConvertError::UnknownCurrency(code.to_string()));

    if from == PIVOT {
        Ok(amount * rate(to)?)
    } else if to == PIVOT {
        Ok(amount / rate(from)?)
    } else {
        let usd_amount = amount / rate(from)?;
        Ok(usd_amount * rate(to)?)
    }
}
