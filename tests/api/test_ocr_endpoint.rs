// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /ocr tests against the stub engine
//!
//! The stub returns a single detection: "TEST" at 0.95 with a 10x10 box.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fabstir_ocr_service::{
    api::{create_app, AppState},
    api::ocr::MAX_UPLOAD_BYTES,
    vision::ocr::{OcrEngineAdapter, StubEngineFactory},
};
use std::sync::Arc;

use super::support::{
    corrupted_png, jpeg_bytes, multipart_request, png_bytes, send, stub_app, Part,
};

#[tokio::test]
async fn test_png_upload_returns_stub_detection() {
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "scan.png", "image/png", png_bytes())],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["text"], "TEST");
    assert_eq!(json["data"][0]["confidence"], 0.95);
    assert_eq!(
        json["data"][0]["bbox"],
        serde_json::json!([[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]])
    );
    assert!(json["processing_time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_count_matches_data_length() {
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "photo.jpg", "image/jpeg", jpeg_bytes())],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["count"].as_u64().unwrap() as usize,
        json["data"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_unsupported_content_type_is_400() {
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "notes.txt", "text/plain", b"hello".to_vec())],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("text/plain"));
}

#[tokio::test]
async fn test_webp_is_rejected_even_if_valid() {
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "scan.webp", "image/webp", png_bytes())],
    );
    let (status, _) = send(stub_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_over_limit_is_413() {
    let request = multipart_request(
        "/ocr",
        &[Part::file(
            "file",
            "huge.png",
            "image/png",
            vec![0u8; MAX_UPLOAD_BYTES + 1],
        )],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_oversized_file_reports_received_size() {
    let size = MAX_UPLOAD_BYTES * 2;
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "huge.png", "image/png", vec![0u8; size])],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        json["error"],
        format!(
            "File too large: {} bytes (max: {} bytes)",
            size, MAX_UPLOAD_BYTES
        )
    );
}

#[tokio::test]
async fn test_request_over_body_limit_is_413() {
    let adapter = OcrEngineAdapter::new(Arc::new(StubEngineFactory::new()), true);
    let app = create_app(AppState::new(Arc::new(adapter), 1024));

    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "scan.png", "image/png", vec![7u8; 4096])],
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_corrupted_image_is_500() {
    let request = multipart_request(
        "/ocr",
        &[Part::file("file", "broken.png", "image/png", corrupted_png())],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));
}

#[tokio::test]
async fn test_missing_file_part_is_422() {
    let request = multipart_request("/ocr", &[Part::text("note", "no file here")]);
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_non_multipart_body_is_422() {
    let request = Request::post("/ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image":"abc"}"#))
        .unwrap();
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_unnamed_file_part_is_accepted() {
    // Any part carrying a filename stands in for `file`
    let request = multipart_request(
        "/ocr",
        &[
            Part::text("lang", "en"),
            Part::file("image", "scan.png", "image/png", png_bytes()),
        ],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn test_engine_failure_is_500_then_recovers() {
    let factory = Arc::new(StubEngineFactory::new().failing_first(1));
    let adapter = OcrEngineAdapter::new(factory.clone(), true);
    let app = create_app(AppState::new(Arc::new(adapter), 64 * 1024 * 1024));

    let upload = || {
        multipart_request(
            "/ocr",
            &[Part::file("file", "scan.png", "image/png", png_bytes())],
        )
    };

    let (status, json) = send(app.clone(), upload()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));

    let (status, json) = send(app, upload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["text"], "TEST");
    assert_eq!(factory.constructions(), 2);
}
