// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAPI document for the HTTP API, served through Swagger UI

use utoipa::OpenApi;

use super::errors::ErrorResponse;
use super::handlers::{self, HealthResponse, ServiceInfoResponse};
use super::ocr::handler::{self as ocr_handlers, BatchOcrUpload, OcrUpload};
use super::ocr::{BatchEntry, BatchOcrResponse, OcrResponse, OcrResponseBody};
use crate::vision::ocr::RecognizedTextRegion;

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "PaddleOCR API"),
    paths(
        handlers::root_handler,
        handlers::health_handler,
        ocr_handlers::ocr_handler,
        ocr_handlers::batch_ocr_handler,
    ),
    components(schemas(
        HealthResponse,
        ServiceInfoResponse,
        OcrResponse,
        OcrResponseBody,
        BatchEntry,
        BatchOcrResponse,
        RecognizedTextRegion,
        ErrorResponse,
        OcrUpload,
        BatchOcrUpload,
    )),
    tags(
        (name = "service", description = "Liveness and metadata"),
        (name = "ocr", description = "Text extraction from uploaded images"),
    )
)]
pub struct ApiDoc;
