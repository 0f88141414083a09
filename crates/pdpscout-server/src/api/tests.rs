use super::*;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use pdpscout_core::Platform;
use pdpscout_scraper::{
    EngineConfig, FetchResponse, ResolverTable, ScraperError, StrategyRegistry, Transport,
};
use std::time::Duration;
use tower::ServiceExt;

/// Every page is missing, so every lookup settles as `NotFound` quickly.
struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn get(&self, _url: &str) -> Result<FetchResponse, ScraperError> {
        Ok(FetchResponse {
            status: 404,
            body: String::new(),
        })
    }
}

fn catalog() -> Vec<StoreTarget> {
    let mut vea = StoreTarget::user_supplied("vea", "https://www.vea.com.ar");
    vea.name = "Vea".to_string();
    vea.platform = Some(Platform::Vtex);
    let mut dia = StoreTarget::user_supplied("dia", "https://diaonline.supermercadosdia.com.ar");
    dia.name = "Día".to_string();
    dia.platform = Some(Platform::Vtex);
    vec![vea, dia]
}

fn test_app() -> Router {
    let catalog = catalog();
    let engine = ResolutionEngine::new(
        Arc::new(OfflineTransport),
        Arc::new(StrategyRegistry::new()),
        Arc::new(ResolverTable::from_stores(&catalog)),
        EngineConfig {
            max_concurrent_lookups: 4,
            store_timeout: Duration::from_secs(2),
        },
    );
    build_app(AppState {
        engine: Arc::new(engine),
        catalog: Arc::new(catalog),
        jobs: JobRegistry::new(),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_job(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/jobs")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_unknown_code_maps_to_internal_error() {
    let response = ApiError::new("req-1", "boom", "unexpected").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_lists_catalog_slugs_with_meta() {
    let app = test_app();
    let (status, json) = send(&app, get_request("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["stores"], serde_json::json!(["vea", "dia"]));
    assert!(json["meta"]["request_id"].is_string());
    assert!(json["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn stores_lists_catalog_entries() {
    let app = test_app();
    let (status, json) = send(&app, get_request("/api/v1/stores")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[1]["slug"], "dia");
    assert_eq!(data[1]["name"], "Día");
    assert_eq!(data[1]["platform"], "vtex");
    assert_eq!(data[1]["resolver"], "generic");
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_runs_to_completion_and_exposes_result_table() {
    let app = test_app();
    let (status, json) = send(
        &app,
        post_job(&serde_json::json!({
            "identifiers": ["7793742007897", "", "7790580123456"],
            "stores": ["dia"],
            "custom_stores": [{ "name": "Mi Tienda", "url": "tienda.example" }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["data"]["total"], 3);
    let job_id = json["data"]["job_id"].as_str().expect("job id").to_string();

    let mut progress = serde_json::Value::Null;
    for _ in 0..100 {
        let (status, json) = send(&app, get_request(&format!("/api/v1/jobs/{job_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        progress = json["data"].clone();
        if progress["status"] != "running" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(progress["status"], "finished");
    assert_eq!(progress["done"], 3);

    let (status, json) = send(&app, get_request(&format!("/api/v1/jobs/{job_id}/result"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["stores"], serde_json::json!(["dia", "mi_tienda"]));
    let rows = json["data"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["identifier"], "7793742007897");
    assert_eq!(
        rows[0]["cells"],
        serde_json::json!(["NotFound", "NotFound"])
    );
}

#[tokio::test]
async fn job_with_empty_identifiers_is_rejected() {
    let app = test_app();
    let (status, json) = send(&app, post_job(&serde_json::json!({ "identifiers": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn job_with_unknown_store_is_rejected() {
    let app = test_app();
    let (status, json) = send(
        &app,
        post_job(&serde_json::json!({ "identifiers": ["779"], "stores": ["jumbo"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("jumbo")));
}

#[tokio::test]
async fn unknown_or_malformed_job_id_is_not_found() {
    let app = test_app();

    let (status, json) = send(
        &app,
        get_request("/api/v1/jobs/9f1c7f0e-3c5b-4d53-9a43-0c4b1d2e6f70"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");

    let (status, _) = send(&app, get_request("/api/v1/jobs/not-a-uuid/result")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
