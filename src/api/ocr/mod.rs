// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST /ocr and POST /batch_ocr for extracting text from uploaded images.

pub mod handler;
pub mod pipeline;
pub mod request;
pub mod response;

pub use handler::{batch_ocr_handler, ocr_handler, BATCH_FIELD, SINGLE_FIELD};
pub use pipeline::{BatchItem, OcrPipeline};
pub use request::{ImageSubmission, ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};
pub use response::{BatchEntry, BatchOcrResponse, OcrResponse, OcrResponseBody};
