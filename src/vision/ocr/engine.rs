// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition engine contract
//!
//! The engine is an external collaborator: it takes a decoded image and an
//! angle-classification flag and returns raw detections grouped into lines.
//! Nothing downstream of the adapter sees engine internals.

use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

/// One word-level detection as reported by an engine
///
/// Engines may report a polygon with the wrong number of points or omit the
/// text or score. `format_regions` validates each detection and drops the
/// malformed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Polygon corners in image coordinates, expected to be exactly 4
    pub polygon: Vec<[f64; 2]>,
    /// Recognized text
    pub text: Option<String>,
    /// Recognition score, expected in [0, 1]
    pub confidence: Option<f64>,
}

impl RawDetection {
    pub fn new(polygon: Vec<[f64; 2]>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            polygon,
            text: Some(text.into()),
            confidence: Some(confidence),
        }
    }
}

/// Raw engine output: a list of lines, each a list of detections
///
/// A `None` line means the engine found nothing on that page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOcrOutput {
    pub lines: Vec<Option<Vec<RawDetection>>>,
}

impl RawOcrOutput {
    pub fn empty() -> Self {
        Self { lines: vec![None] }
    }

    pub fn single_line(detections: Vec<RawDetection>) -> Self {
        Self {
            lines: vec![Some(detections)],
        }
    }

    /// Total number of detections across all lines
    pub fn detection_count(&self) -> usize {
        self.lines.iter().flatten().map(Vec::len).sum()
    }
}

/// A loaded recognition engine
///
/// `recognize` is synchronous and CPU-bound; callers on the async runtime
/// must run it on the blocking pool.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage, use_angle_cls: bool) -> Result<RawOcrOutput>;
}

/// Builds an engine. Construction loads models and is expensive.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn OcrEngine>>;

    /// Short name for logs
    fn name(&self) -> &str;
}
