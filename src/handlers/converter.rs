use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AppState;
use crate::models::conversion::ConversionRequest;
use crate::services::converter;
use crate::services::refresh_service::{refresh_rates, RefreshResult};
use crate::services::widget::WidgetView;
use crate::utils::error::ApiError;
use crate::utils::format::{format_number, parse_amount, rate_label, with_symbol};

#[derive(Deserialize)]
pub struct InputForm {
    pub amount: String,
}

#[derive(Deserialize, Default)]
pub struct ConvertForm {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct ConvertParams {
    pub amount: Option<String>,
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
pub struct ConvertResponse {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub implied_rate: f64,
    pub formatted: String,
    pub display: String,
    pub rate: String,
}

#[derive(Serialize)]
pub struct RetryResponse {
    pub refresh: RefreshResult,
    pub widget: WidgetView,
}

fn normalize_code(raw: &str) -> Result<String, ApiError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::Validation(
            "currency must be a 3-letter ISO code (e.g., EUR)".into(),
        ));
    }
    Ok(code)
}

async fn snapshot(state: &AppState) -> WidgetView {
    state.widget.read().await.view(state.debouncer.is_pending())
}

pub async fn get_widget(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(snapshot(&state).await))
}

/// Amount typing: store the raw text now, convert once input settles.
pub async fn input(
    State(state): State<AppState>,
    Json(form): Json<InputForm>,
) -> impl IntoResponse {
    state.widget.write().await.set_amount(&form.amount);

    let widget = state.widget.clone();
    state.debouncer.schedule(state.debounce, async move {
        if let Err(e) = widget.write().await.recompute() {
            warn!("debounced conversion failed: {}", e);
        }
    });

    (StatusCode::ACCEPTED, Json(snapshot(&state).await))
}

/// Convert button, Enter key and currency selection changes.
pub async fn convert(
    State(state): State<AppState>,
    body: Option<Json<ConvertForm>>,
) -> Result<impl IntoResponse, ApiError> {
    let form = body.map(|Json(f)| f).unwrap_or_default();
    let from = form.from.as_deref().map(normalize_code).transpose()?;
    let to = form.to.as_deref().map(normalize_code).transpose()?;

    state.widget.write().await.apply(form.amount.as_deref(), from, to)?;
    state.debouncer.cancel();

    Ok((StatusCode::OK, Json(snapshot(&state).await)))
}

pub async fn swap(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.widget.write().await.swap()?;
    Ok((StatusCode::OK, Json(snapshot(&state).await)))
}

pub async fn retry(State(state): State<AppState>) -> impl IntoResponse {
    let refresh = refresh_rates(&state).await;
    let widget = snapshot(&state).await;
    (StatusCode::OK, Json(RetryResponse { refresh, widget }))
}

pub async fn rates(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let table = state
        .widget
        .read()
        .await
        .table()
        .ok_or_else(|| ApiError::Unavailable("exchange rates not loaded".into()))?;
    Ok((StatusCode::OK, Json(table.as_ref().clone())))
}

/// One-off conversion against the current table; widget selections are
/// left untouched.
pub async fn convert_once(
    State(state): State<AppState>,
    Query(p): Query<ConvertParams>,
) -> Result<impl IntoResponse, ApiError> {
    let from = normalize_code(&p.from)?;
    let to = normalize_code(&p.to)?;
    let amount = parse_amount(p.amount.as_deref().unwrap_or("1"));

    let table = state.widget.read().await.table();
    let req = ConversionRequest::new(amount, from, to);
    let result = converter::convert(&req, table.as_deref())?;

    let formatted = format_number(result.converted_amount);
    Ok((
        StatusCode::OK,
        Json(ConvertResponse {
            display: with_symbol(&formatted, &req.to),
            rate: rate_label(&req.from, &req.to, result.implied_rate),
            formatted,
            amount: req.amount,
            converted_amount: result.converted_amount,
            implied_rate: result.implied_rate,
            from: req.from,
            to: req.to,
        }),
    ))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "ok": true })))
}
