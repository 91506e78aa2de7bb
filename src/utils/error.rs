use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")] pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: "Validation failed", details: Some(msg) }),
            ).into_response(),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody { error: "Exchange rates unavailable", details: Some(msg) }),
            ).into_response(),
        }
    }
}

/// Failure to obtain a rate table from the remote source.
#[derive(Error, Debug)]
pub enum RateError {
    #[error("network: {0}")]
    Network(String),
    #[error("api: {0}")]
    Api(String),
    #[error("decode: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("exchange rates not loaded")]
    RatesUnavailable,
    #[error("unsupported currency: {0}")]
    UnknownCurrency(String),
}

impl From<ConvertError> for ApiError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::RatesUnavailable => ApiError::Unavailable(e.to_string()),
            _ => ApiError::Validation(e.to_string()),
        }
    }
}
