// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-image OCR pipeline and batch orchestration
//!
//! validate -> decode -> recognize -> format. Independent of HTTP so batch
//! processing can call it per file.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::ImageSubmission;
use crate::api::errors::ServiceError;
use crate::vision::decode_image_bytes;
use crate::vision::ocr::{format_regions, OcrEngineAdapter, OcrResult};

/// Outcome for one file of a batch
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub filename: Option<String>,
    pub outcome: Result<OcrResult, ServiceError>,
}

#[derive(Debug, Clone)]
pub struct OcrPipeline {
    adapter: Arc<OcrEngineAdapter>,
}

impl OcrPipeline {
    pub fn new(adapter: Arc<OcrEngineAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<OcrEngineAdapter> {
        &self.adapter
    }

    /// Run OCR on one uploaded image
    pub async fn process(&self, submission: ImageSubmission) -> Result<OcrResult, ServiceError> {
        let started = Instant::now();

        let result = self.run(&submission, started).await;
        match &result {
            Ok(ocr) => info!(
                "OCR complete for {}: {} regions, {}ms",
                submission.filename().unwrap_or("<unnamed>"),
                ocr.count(),
                ocr.processing_time_ms()
            ),
            Err(e) if e.kind.is_client_error() => warn!(
                "Rejected upload {}: {}",
                submission.filename().unwrap_or("<unnamed>"),
                e
            ),
            Err(e) => error!(
                "OCR failed for {} ({}): {}",
                submission.filename().unwrap_or("<unnamed>"),
                e.kind,
                e
            ),
        }
        result
    }

    async fn run(
        &self,
        submission: &ImageSubmission,
        started: Instant,
    ) -> Result<OcrResult, ServiceError> {
        submission.validate()?;

        let data = submission.data().clone();
        let (image, info) = tokio::task::spawn_blocking(move || decode_image_bytes(&data))
            .await
            .map_err(ServiceError::decode_failure)??;

        debug!(
            "Decoded image: {}x{}, format: {:?}, {} bytes",
            info.width, info.height, info.format, info.size_bytes
        );

        let raw = self.adapter.recognize(image).await?;
        let regions = format_regions(&raw);

        Ok(OcrResult::new(regions, started.elapsed()))
    }

    /// Run OCR on each image in order; one failure never stops the rest
    pub async fn process_batch(&self, submissions: Vec<ImageSubmission>) -> Vec<BatchItem> {
        let total = submissions.len();
        let mut items = Vec::with_capacity(total);

        for submission in submissions {
            let filename = submission.filename().map(str::to_string);
            let outcome = self.process(submission).await;
            items.push(BatchItem { filename, outcome });
        }

        let failed = items.iter().filter(|item| item.outcome.is_err()).count();
        info!("Batch OCR complete: {} files, {} failed", total, failed);

        items
    }
}
