use std::{env, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serial_test::serial;
use tokio::time::sleep;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{AppConfig, AppState};
use crate::models::rate_table::RateSource;
use crate::services::refresh_service::refresh_rates;

const FALLBACK_CODES: [&str; 10] = ["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "SEK", "NZD"];

fn test_config(mock: &MockServer) -> AppConfig {
    AppConfig {
        port: 0,
        rates_base_url: mock.uri(),
        rates_api_key: "test-key".into(),
        external_timeout_ms: 2_000,
        debounce_ms: 50,
        default_amount: "100".into(),
        default_from: "USD".into(),
        default_to: "EUR".into(),
    }
}

async fn mount_rates(mock: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/test-key/latest/USD"))
        .respond_with(template)
        .mount(mock)
        .await;
}

fn success_body() -> serde_json::Value {
    serde_json::json!({
        "result": "success",
        "base_code": "USD",
        "conversion_rates": { "USD": 1, "EUR": 0.9, "GBP": 0.8, "MXN": 17.1, "BAD": 0 }
    })
}

fn build_app(mock: &MockServer) -> (AppState, Router) {
    let state = test_config(mock).build_state().expect("state");
    (state.clone(), crate::routes::router(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn it_loads_remote_rates_and_converts() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (state, app) = build_app(&mock);

    let (status, w) = send(&app, "GET", "/widget", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(w["status"], "loading");
    assert!(w["result"].is_null());

    let res = refresh_rates(&state).await;
    assert!(res.installed);
    assert!(res.error.is_none());
    // BAD=0 is dropped
    assert_eq!(res.currencies, 4);

    let (_, w) = send(&app, "GET", "/widget", None).await;
    assert_eq!(w["status"], "ready");
    assert_eq!(w["source"], "remote");
    assert_eq!(w["result"]["amount"], "90.00");
    assert_eq!(w["result"]["currency"], "EUR");
    assert_eq!(w["result"]["rate"], "1 USD = 0.90 EUR");

    let (status, rates) = send(&app, "GET", "/rates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rates["rates"]["MXN"], 17.1);
    assert!(rates["rates"].get("BAD").is_none());
}

#[tokio::test]
async fn it_falls_back_when_the_api_is_down() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(500)).await;
    let (state, app) = build_app(&mock);

    let res = refresh_rates(&state).await;
    assert!(res.installed);
    assert!(res.error.as_deref().unwrap().contains("500"));

    let (_, rates) = send(&app, "GET", "/rates", None).await;
    assert_eq!(rates["source"], "fallback");
    for code in FALLBACK_CODES {
        assert!(rates["rates"].get(code).is_some(), "missing {code}");
    }
    assert_eq!(rates["rates"]["USD"], 1.0);

    let (_, w) = send(&app, "GET", "/widget", None).await;
    assert_eq!(w["status"], "error");
    assert_eq!(w["result"]["amount"], "85.00");
}

#[tokio::test]
async fn it_falls_back_on_an_api_error_body() {
    let mock = MockServer::start().await;
    let body = serde_json::json!({ "result": "error", "error-type": "invalid-key" });
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(body)).await;
    let (state, _app) = build_app(&mock);

    let res = refresh_rates(&state).await;
    assert_eq!(res.error.as_deref(), Some("api: invalid-key"));
    assert_eq!(res.currencies, 10);
}

#[tokio::test]
async fn it_falls_back_on_a_malformed_body() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let (state, _app) = build_app(&mock);

    let res = refresh_rates(&state).await;
    assert!(res.error.unwrap().starts_with("decode:"));
}

#[tokio::test]
async fn it_falls_back_when_success_carries_no_rates() {
    for body in [
        serde_json::json!({ "result": "success" }),
        serde_json::json!({ "result": "success", "conversion_rates": {} }),
    ] {
        let mock = MockServer::start().await;
        mount_rates(&mock, ResponseTemplate::new(200).set_body_json(body)).await;
        let (state, _app) = build_app(&mock);

        let res = refresh_rates(&state).await;
        assert_eq!(res.error.as_deref(), Some("decode: response carried no conversion_rates"));
        assert_eq!(res.source, RateSource::Fallback);
        assert_eq!(res.currencies, 10);
    }
}

#[tokio::test]
async fn it_keeps_the_widget_when_a_convert_is_rejected() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (state, app) = build_app(&mock);
    refresh_rates(&state).await;

    let (status, before) = send(&app, "POST", "/widget/convert", Some(serde_json::json!({ "to": "GBP" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["result"]["amount"], "80.00");

    let form = serde_json::json!({ "amount": "7", "to": "XYZ" });
    let (status, _) = send(&app, "POST", "/widget/convert", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, after) = send(&app, "GET", "/widget", None).await;
    assert_eq!(after["amount"], "100");
    assert_eq!(after["to"], "GBP");
    assert_eq!(after["result"], before["result"]);

    let (status, swapped) = send(&app, "POST", "/widget/swap", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(swapped["result"]["currency"], "USD");
}

#[tokio::test]
async fn it_debounces_amount_input() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (state, app) = build_app(&mock);
    refresh_rates(&state).await;

    for amount in ["1", "10", "1000"] {
        let (status, w) = send(&app, "POST", "/widget/input", Some(serde_json::json!({ "amount": amount }))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(w["result"]["amount"], "90.00");
    }

    sleep(Duration::from_millis(300)).await;
    let (_, w) = send(&app, "GET", "/widget", None).await;
    assert_eq!(w["amount"], "1000");
    assert_eq!(w["result"]["amount"], "900.00");
    assert_eq!(w["conversion_pending"], false);
}

#[tokio::test]
async fn it_converts_swaps_and_validates() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (state, app) = build_app(&mock);
    refresh_rates(&state).await;

    let form = serde_json::json!({ "amount": "2500000", "from": "gbp", "to": "mxn" });
    let (status, w) = send(&app, "POST", "/widget/convert", Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(w["from"], "GBP");
    assert_eq!(w["result"]["amount"], "53.44M");
    assert_eq!(w["result"]["display"], "MXN53.44M");

    let (status, w) = send(&app, "POST", "/widget/swap", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(w["from"], "MXN");
    assert_eq!(w["to"], "GBP");
    assert_eq!(w["result"]["currency"], "GBP");

    let (status, _) = send(&app, "POST", "/widget/convert", Some(serde_json::json!({ "to": "EURO" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/widget/convert", Some(serde_json::json!({ "to": "XYZ" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "unsupported currency: XYZ");
}

#[tokio::test]
async fn it_converts_once_without_touching_the_widget() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (state, app) = build_app(&mock);

    let (status, _) = send(&app, "GET", "/convert?amount=10&from=EUR&to=GBP", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    refresh_rates(&state).await;
    let (status, c) = send(&app, "GET", "/convert?amount=0.001&from=USD&to=EUR", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(c["formatted"], "9.00e-4");
    assert_eq!(c["rate"], "1 USD = 0.90 EUR");

    let (_, w) = send(&app, "GET", "/widget", None).await;
    assert_eq!(w["amount"], "100");
}

#[tokio::test]
async fn it_retries_and_reports() {
    let mock = MockServer::start().await;
    mount_rates(&mock, ResponseTemplate::new(200).set_body_json(success_body())).await;
    let (_state, app) = build_app(&mock);

    let (status, body) = send(&app, "POST", "/widget/retry", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refresh"]["source"], "remote");
    assert_eq!(body["widget"]["status"], "ready");
    assert_eq!(body["widget"]["result"]["display"], "€90.00");

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[test]
#[serial]
fn config_reads_env_with_defaults() {
    for key in ["PORT", "RATES_BASE_URL", "RATES_API_KEY", "EXTERNAL_TIMEOUT_MS", "DEFAULT_AMOUNT", "DEFAULT_FROM"] {
        env::remove_var(key);
    }
    env::set_var("DEBOUNCE_MS", "250");
    env::set_var("DEFAULT_TO", "gbp");

    let cfg = AppConfig::from_env().expect("config");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.debounce_ms, 250);
    assert_eq!(cfg.external_timeout_ms, 12_000);
    assert_eq!(cfg.default_to, "GBP");
    assert_eq!(cfg.rates_url(), "https://v6.exchangerate-api.com/v6/demo/latest/USD");

    env::remove_var("DEBOUNCE_MS");
    env::remove_var("DEFAULT_TO");
}
