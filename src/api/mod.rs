// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod docs;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod ocr;

pub use docs::ApiDoc;
pub use errors::{ErrorKind, ErrorResponse, ServiceError};
pub use handlers::{
    health_handler, root_handler, HealthResponse, ServiceInfoResponse, DOCS_URL, OPENAPI_URL,
};
pub use http_server::{create_app, start_server, AppState};
pub use ocr::{
    batch_ocr_handler, ocr_handler, BatchOcrResponse, ImageSubmission, OcrPipeline, OcrResponse,
};
