use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::AppState;
use crate::models::rate_table::RateSource;
use crate::services::rate_provider;

#[derive(Serialize)]
pub struct RefreshResult {
    pub source: RateSource,
    pub currencies: usize,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub last_refreshed_at: String,
}

/// Loads rates from the remote API, falling back to the static table on any
/// failure, then re-runs the current conversion.
pub async fn refresh_rates(state: &AppState) -> RefreshResult {
    let generation = state.widget.write().await.begin_load();

    let (table, reason) = match rate_provider::load(&state.http, &state.rates_url).await {
        Ok(table) => (table, None),
        Err(e) => {
            error!("Error loading exchange rates: {}", e);
            (rate_provider::fallback(), Some(e.to_string()))
        }
    };

    let source = table.source;
    let currencies = table.len();
    let last_refreshed_at = table.updated_at.to_rfc3339();

    let mut widget = state.widget.write().await;
    let installed = widget.finish_load(generation, table, reason.clone());
    if installed {
        if let Err(e) = widget.recompute() {
            warn!("conversion after refresh failed: {}", e);
        }
        info!("✅ Rates ready ({} currencies, {:?})", currencies, source);
    }

    RefreshResult { source, currencies, installed, error: reason, last_refreshed_at }
}
