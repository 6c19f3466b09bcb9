// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health and GET / tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use fabstir_ocr_service::{
    api::{create_app, AppState},
    vision::ocr::{EngineState, OcrEngineAdapter, StubEngineFactory},
};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use super::support::{multipart_request, png_bytes, send, stub_app, Part};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_body() {
    let (status, json) = send(stub_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "status": "healthy",
            "service": "PaddleOCR API",
            "version": "1.0.0"
        })
    );
}

#[tokio::test]
async fn test_health_is_idempotent() {
    let app = stub_app();
    let (_, first) = send(app.clone(), get("/health")).await;
    let (_, second) = send(app, get("/health")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_ok_when_engine_cannot_load() {
    let factory = Arc::new(StubEngineFactory::new().failing_first(usize::MAX));
    let adapter = Arc::new(OcrEngineAdapter::new(factory, true));
    let app = create_app(AppState::new(adapter.clone(), 64 * 1024 * 1024));

    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "scan.png", "image/png", png_bytes())],
    );
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(adapter.state(), EngineState::Uninitialized);

    let (status, json) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_root_describes_service() {
    let (status, json) = send(stub_app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "PaddleOCR API");
    assert_eq!(json["version"], "1.0.0");
    let endpoints = json["endpoints"].as_object().unwrap();
    assert!(endpoints.contains_key("POST /ocr"));
    assert!(endpoints.contains_key("POST /batch_ocr"));
    assert!(endpoints.contains_key("GET /docs"));
    assert_eq!(json["docs_url"], "/docs");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let (status, json) = send(stub_app(), get("/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    let paths = json["paths"].as_object().unwrap();
    for route in ["/", "/health", "/ocr", "/batch_ocr"] {
        assert!(paths.contains_key(route), "missing {}", route);
    }
    assert!(paths["/ocr"]["post"]["responses"]
        .as_object()
        .unwrap()
        .contains_key("413"));
}

#[tokio::test]
async fn test_docs_serves_swagger_ui() {
    let app = stub_app();

    let response = app.clone().oneshot(get("/docs/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("swagger-ui"));

    let response = app.oneshot(get("/docs")).await.unwrap();
    assert!(response.status().is_redirection() || response.status() == StatusCode::OK);
}
