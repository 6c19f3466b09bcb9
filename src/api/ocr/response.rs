// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response bodies

use serde::Serialize;
use utoipa::ToSchema;

use super::pipeline::BatchItem;
use crate::api::errors::ErrorResponse;
use crate::vision::ocr::{OcrResult, RecognizedTextRegion};

/// Successful single-image response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OcrResponse {
    pub success: bool,
    /// Regions in detection order
    pub data: Vec<RecognizedTextRegion>,
    /// Always `data.len()`
    pub count: usize,
    pub processing_time_ms: f64,
}

impl From<OcrResult> for OcrResponse {
    fn from(result: OcrResult) -> Self {
        let processing_time_ms = result.processing_time_ms();
        let data = result.into_regions();
        Self {
            success: true,
            count: data.len(),
            data,
            processing_time_ms,
        }
    }
}

/// The body `/ocr` would have returned for one file
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OcrResponseBody {
    Success(OcrResponse),
    Failure(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchEntry {
    pub filename: Option<String>,
    pub result: OcrResponseBody,
}

impl From<BatchItem> for BatchEntry {
    fn from(item: BatchItem) -> Self {
        let result = match item.outcome {
            Ok(result) => OcrResponseBody::Success(result.into()),
            Err(err) => OcrResponseBody::Failure(err.to_response()),
        };
        Self {
            filename: item.filename,
            result,
        }
    }
}

/// Batch response: one entry per uploaded file, in upload order
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchOcrResponse {
    pub batch_results: Vec<BatchEntry>,
}

impl From<Vec<BatchItem>> for BatchOcrResponse {
    fn from(items: Vec<BatchItem>) -> Self {
        Self {
            batch_results: items.into_iter().map(BatchEntry::from).collect(),
        }
    }
}
