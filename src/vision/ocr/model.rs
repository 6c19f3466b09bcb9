// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalized OCR result types
//!
//! Invariants are checked at construction and the fields are read-only
//! afterwards.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Why a raw detection could not become a `RecognizedTextRegion`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("polygon has {0} points, expected 4")]
    WrongPointCount(usize),

    #[error("polygon has a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("detection has no text")]
    MissingText,

    #[error("detection has no confidence")]
    MissingConfidence,

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// A detected text region with its 4-point bounding polygon
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecognizedTextRegion {
    text: String,
    /// In [0, 1]
    confidence: f64,
    /// Exactly 4 `[x, y]` points
    #[schema(value_type = Vec<Vec<f64>>)]
    bbox: [[f64; 2]; 4],
}

impl RecognizedTextRegion {
    pub fn new(
        text: impl Into<String>,
        confidence: f64,
        polygon: &[[f64; 2]],
    ) -> Result<Self, RegionError> {
        let bbox: [[f64; 2]; 4] = polygon
            .try_into()
            .map_err(|_| RegionError::WrongPointCount(polygon.len()))?;

        if bbox.iter().flatten().any(|c| !c.is_finite()) {
            return Err(RegionError::NonFiniteCoordinate);
        }

        // Also rejects NaN
        if !(0.0..=1.0).contains(&confidence) {
            return Err(RegionError::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            text: text.into(),
            confidence,
            bbox,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn bbox(&self) -> &[[f64; 2]; 4] {
        &self.bbox
    }
}

/// Result of OCR on one image
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    regions: Vec<RecognizedTextRegion>,
    processing_time_ms: f64,
}

impl OcrResult {
    /// `elapsed` is reported in milliseconds rounded to two decimals
    pub fn new(regions: Vec<RecognizedTextRegion>, elapsed: Duration) -> Self {
        let ms = elapsed.as_secs_f64() * 1000.0;
        Self {
            regions,
            processing_time_ms: (ms * 100.0).round() / 100.0,
        }
    }

    /// Regions in engine detection order
    pub fn regions(&self) -> &[RecognizedTextRegion] {
        &self.regions
    }

    pub fn count(&self) -> usize {
        self.regions.len()
    }

    pub fn processing_time_ms(&self) -> f64 {
        self.processing_time_ms
    }

    pub fn into_regions(self) -> Vec<RecognizedTextRegion> {
        self.regions
    }
}
