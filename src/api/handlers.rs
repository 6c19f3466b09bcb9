// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::version::{SERVICE_NAME, VERSION};

/// Swagger UI path; the OpenAPI document is at `OPENAPI_URL`
pub const DOCS_URL: &str = "/docs";
pub const OPENAPI_URL: &str = "/openapi.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfoResponse {
    pub name: String,
    pub version: String,
    /// "METHOD /path" -> description
    pub endpoints: BTreeMap<String, String>,
    pub docs_url: String,
}

/// GET /health
///
/// Liveness only. Never touches the engine, so it answers before the
/// models are loaded and while a cold start is in progress.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service metadata", body = ServiceInfoResponse))
)]
pub async fn root_handler() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        name: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        endpoints: [
            ("GET /health", "Health check"),
            ("POST /ocr", "OCR on a single image"),
            ("POST /batch_ocr", "OCR on multiple images"),
            ("GET /docs", "Swagger UI"),
        ]
        .iter()
        .map(|(route, description)| (route.to_string(), description.to_string()))
        .collect(),
        docs_url: DOCS_URL.to_string(),
    })
}
