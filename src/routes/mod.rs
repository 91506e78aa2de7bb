use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppState;
use crate::handlers::converter::{
    convert, convert_once, get_widget, health, input, rates, retry, swap,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/widget", get(get_widget))
        .route("/widget/input", post(input))
        .route("/widget/convert", post(convert))
        .route("/widget/swap", post(swap))
        .route("/widget/retry", post(retry))
        .route("/rates", get(rates))
        .route("/convert", get(convert_once))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
