use reqwest::Client;
use std::{env, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use crate::services::debounce::Debouncer;
use crate::services::widget::Widget;

#[derive(Clone)]
pub struct AppState {
    pub http: Client,
    pub rates_url: String,
    pub debounce: Duration,
    pub widget: Arc<RwLock<Widget>>,
    pub debouncer: Arc<Debouncer>,
}

pub struct AppConfig {
    pub port: u16,
    pub rates_base_url: String,
    pub rates_api_key: String,
    pub external_timeout_ms: u64,
    pub debounce_ms: u64,
    pub default_amount: String,
    pub default_from: String,
    pub default_to: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let port: u16 = env::var("PORT").unwrap_or_else(|_| "8080".into()).parse()?;
        let rates_base_url = env::var("RATES_BASE_URL")
            .unwrap_or_else(|_| "https://v6.exchangerate-api.com/v6".into());
        let rates_api_key = env::var("RATES_API_KEY").unwrap_or_else(|_| "demo".into());
        let external_timeout_ms: u64 = env::var("EXTERNAL_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12_000);
        let debounce_ms: u64 = env::var("DEBOUNCE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500);
        let default_amount = env::var("DEFAULT_AMOUNT").unwrap_or_else(|_| "1".into());
        let default_from = env::var("DEFAULT_FROM").unwrap_or_else(|_| "USD".into()).to_uppercase();
        let default_to = env::var("DEFAULT_TO").unwrap_or_else(|_| "EUR".into()).to_uppercase();
        Ok(Self {
            port,
            rates_base_url,
            rates_api_key,
            external_timeout_ms,
            debounce_ms,
            default_amount,
            default_from,
            default_to,
        })
    }

    pub fn rates_url(&self) -> String {
        format!("{}/{}/latest/USD", self.rates_base_url.trim_end_matches('/'), self.rates_api_key)
    }

    pub fn build_state(&self) -> Result<AppState, anyhow::Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(self.external_timeout_ms))
            .build()?;

        let widget = Widget::new(&self.default_amount, &self.default_from, &self.default_to);

        Ok(AppState {
            http,
            rates_url: self.rates_url(),
            debounce: Duration::from_millis(self.debounce_ms),
            widget: Arc::new(RwLock::new(widget)),
            debouncer: Arc::new(Debouncer::new()),
        })
    }
}
