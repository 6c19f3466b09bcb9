// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /batch_ocr tests
//!
//! Every file gets an entry in upload order; a bad file fails alone.

use axum::http::StatusCode;
use fabstir_ocr_service::{
    api::ocr::MAX_UPLOAD_BYTES,
    api::{create_app, AppState},
    config::DEFAULT_MAX_REQUEST_BYTES,
    vision::ocr::{OcrEngineAdapter, StubEngineFactory},
};
use std::sync::Arc;

use super::support::{corrupted_png, multipart_request, png_bytes, send, stub_app, Part};

#[tokio::test]
async fn test_corrupted_file_fails_alone() {
    let request = multipart_request(
        "/batch_ocr",
        &[
            Part::file("files", "first.png", "image/png", png_bytes()),
            Part::file("files", "broken.png", "image/png", corrupted_png()),
            Part::file("files", "third.png", "image/png", png_bytes()),
        ],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["batch_results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["filename"], "first.png");
    assert_eq!(results[0]["result"]["success"], true);
    assert_eq!(results[0]["result"]["count"], 1);
    assert_eq!(results[0]["result"]["data"][0]["text"], "TEST");

    assert_eq!(results[1]["filename"], "broken.png");
    assert_eq!(results[1]["result"]["success"], false);
    assert!(results[1]["result"]["error"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));

    assert_eq!(results[2]["filename"], "third.png");
    assert_eq!(results[2]["result"]["success"], true);
}

#[tokio::test]
async fn test_validation_errors_are_per_file() {
    let request = multipart_request(
        "/batch_ocr",
        &[
            Part::file("files", "notes.txt", "text/plain", b"hello".to_vec()),
            Part::file("files", "scan.png", "image/png", png_bytes()),
        ],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["batch_results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["result"]["success"], false);
    assert!(results[0]["result"]["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported file type"));
    assert_eq!(results[1]["result"]["success"], true);
}

#[tokio::test]
async fn test_single_file_batch() {
    let request = multipart_request(
        "/batch_ocr",
        &[Part::file("files", "only.png", "image/png", png_bytes())],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["batch_results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_batch_is_422() {
    let request = multipart_request("/batch_ocr", &[Part::text("note", "nothing")]);
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_order_matches_upload_order() {
    let names = ["a.png", "b.png", "c.png", "d.png", "e.png"];
    let parts: Vec<Part<'_>> = names
        .iter()
        .map(|name| Part::file("files", name, "image/png", png_bytes()))
        .collect();

    let (status, json) = send(stub_app(), multipart_request("/batch_ocr", &parts)).await;
    assert_eq!(status, StatusCode::OK);

    let returned: Vec<&str> = json["batch_results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["filename"].as_str().unwrap())
        .collect();
    assert_eq!(returned, names);
}

#[tokio::test]
async fn test_oversized_file_fails_alone() {
    // Larger than the whole-request cap of `/ocr`
    let huge = DEFAULT_MAX_REQUEST_BYTES + 1024 * 1024;
    let request = multipart_request(
        "/batch_ocr",
        &[
            Part::file("files", "ok.png", "image/png", png_bytes()),
            Part::file("files", "huge.png", "image/png", vec![0u8; huge]),
            Part::file("files", "ok2.png", "image/png", png_bytes()),
        ],
    );
    let (status, json) = send(stub_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["batch_results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["filename"], "ok.png");
    assert_eq!(results[0]["result"]["success"], true);

    assert_eq!(results[1]["filename"], "huge.png");
    assert_eq!(results[1]["result"]["success"], false);
    assert_eq!(
        results[1]["result"]["error"],
        format!(
            "File too large: {} bytes (max: {} bytes)",
            huge, MAX_UPLOAD_BYTES
        )
    );

    assert_eq!(results[2]["filename"], "ok2.png");
    assert_eq!(results[2]["result"]["success"], true);
}

#[tokio::test]
async fn test_batch_ignores_request_body_cap() {
    let adapter = OcrEngineAdapter::new(Arc::new(StubEngineFactory::new()), true);
    let app = create_app(AppState::new(Arc::new(adapter), 1024));

    let request = multipart_request(
        "/batch_ocr",
        &[
            Part::file("files", "first.png", "image/png", png_bytes()),
            Part::file("files", "padding.png", "image/png", vec![0u8; 4096]),
            Part::file("files", "last.png", "image/png", png_bytes()),
        ],
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["batch_results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["result"]["success"], true);
    assert_eq!(results[1]["result"]["success"], false);
    assert!(results[1]["result"]["error"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));
    assert_eq!(results[2]["result"]["success"], true);
}
