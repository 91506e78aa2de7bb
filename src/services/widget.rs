use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::conversion::{ConversionRequest, ConversionView};
use crate::models::rate_table::{RateSource, RateTable};
use crate::services::converter;
use crate::utils::error::ConvertError;
use crate::utils::format::{format_number, last_updated_label, parse_amount, rate_label, with_symbol};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Ready,
    Error,
}

/// Converter state shared by every handler: the user's selections, the
/// current rate table and what was last rendered.
pub struct Widget {
    amount_input: String,
    from: String,
    to: String,
    table: Option<Arc<RateTable>>,
    status: LoadStatus,
    error: Option<String>,
    view: Option<ConversionView>,
    generation: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct WidgetView {
    pub status: LoadStatus,
    pub error: Option<String>,
    pub amount: String,
    pub from: String,
    pub to: String,
    pub source: Option<RateSource>,
    pub result: Option<ConversionView>,
    pub conversion_pending: bool,
}

impl Widget {
    pub fn new(amount: &str, from: &str, to: &str) -> Self {
        Self {
            amount_input: amount.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            table: None,
            status: LoadStatus::Loading,
            error: None,
            view: None,
            generation: 0,
        }
    }

    /// Marks a new load as in flight and returns its generation. Until it
    /// finishes the converter sees no table.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.error = None;
        self.generation
    }

    /// Installs the table from load `generation`. Results from a load that
    /// has since been superseded are dropped.
    pub fn finish_load(&mut self, generation: u64, table: RateTable, error: Option<String>) -> bool {
        if generation != self.generation {
            debug!("discarding rates from stale load {} (current {})", generation, self.generation);
            return false;
        }
        info!("installed {} rates from {:?}", table.len(), table.source);
        self.table = Some(Arc::new(table));
        self.status = if error.is_some() { LoadStatus::Error } else { LoadStatus::Ready };
        self.error = error;
        true
    }

    /// The table the converter may use right now.
    pub fn table(&self) -> Option<Arc<RateTable>> {
        match self.status {
            LoadStatus::Loading => None,
            _ => self.table.clone(),
        }
    }

    pub fn set_amount(&mut self, input: &str) {
        self.amount_input = input.to_string();
    }

    pub fn select(&mut self, from: Option<String>, to: Option<String>) {
        if let Some(from) = from {
            self.from = from;
        }
        if let Some(to) = to {
            self.to = to;
        }
    }

    pub fn request(&self) -> ConversionRequest {
        ConversionRequest::new(parse_amount(&self.amount_input), self.from.clone(), self.to.clone())
    }

    /// Recomputes the rendered result. A negative amount or a missing table
    /// leaves the previous result in place.
    pub fn recompute(&mut self) -> Result<(), ConvertError> {
        let table = self.table();
        let req = self.request();
        match converter::convert(&req, table.as_deref()) {
            Ok(result) => {
                let Some(table) = table else { return Ok(()) };
                let amount = format_number(result.converted_amount);
                self.view = Some(ConversionView {
                    display: with_symbol(&amount, &req.to),
                    amount,
                    currency: req.to.clone(),
                    rate: rate_label(&req.from, &req.to, result.implied_rate),
                    last_updated: last_updated_label(&table.updated_at),
                });
                Ok(())
            }
            Err(ConvertError::NegativeAmount | ConvertError::RatesUnavailable) => Ok(()),
            Err(e) => {
                self.view = None;
                Err(e)
            }
        }
    }

    /// Applies a convert event. If the new selection cannot be converted
    /// the amount, selection and result stay as they were.
    pub fn apply(
        &mut self,
        amount: Option<&str>,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<(), ConvertError> {
        let saved = self.selection();
        if let Some(amount) = amount {
            self.set_amount(amount);
        }
        self.select(from, to);
        self.recompute_or_restore(saved)
    }

    pub fn swap(&mut self) -> Result<(), ConvertError> {
        let saved = self.selection();
        let swapped = self.request().swapped();
        self.from = swapped.from;
        self.to = swapped.to;
        self.recompute_or_restore(saved)
    }

    fn selection(&self) -> (String, String, String) {
        (self.amount_input.clone(), self.from.clone(), self.to.clone())
    }

    fn recompute_or_restore(&mut self, saved: (String, String, String)) -> Result<(), ConvertError> {
        let previous = self.view.clone();
        if let Err(e) = self.recompute() {
            (self.amount_input, self.from, self.to) = saved;
            self.view = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn view(&self, conversion_pending: bool) -> WidgetView {
        WidgetView {
            status: self.status.clone(),
            error: self.error.clone(),
            amount: self.amount_input.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            source: self.table.as_ref().map(|t| t.source),
            result: self.view.clone(),
            conversion_pending,
        }
    }
}
