// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversion of raw engine output into normalized text regions
//!
//! A malformed detection is skipped and logged; it never fails the whole
//! result.

use tracing::warn;

use super::engine::{RawDetection, RawOcrOutput};
use super::model::{RecognizedTextRegion, RegionError};

impl TryFrom<&RawDetection> for RecognizedTextRegion {
    type Error = RegionError;

    fn try_from(raw: &RawDetection) -> Result<Self, Self::Error> {
        let text = raw.text.as_deref().ok_or(RegionError::MissingText)?;
        let confidence = raw.confidence.ok_or(RegionError::MissingConfidence)?;
        RecognizedTextRegion::new(text, confidence, &raw.polygon)
    }
}

/// Flatten lines into regions, keeping engine detection order
pub fn format_regions(raw: &RawOcrOutput) -> Vec<RecognizedTextRegion> {
    let mut regions = Vec::with_capacity(raw.detection_count());

    for (line_index, line) in raw.lines.iter().enumerate() {
        let Some(detections) = line else { continue };

        for (index, detection) in detections.iter().enumerate() {
            match RecognizedTextRegion::try_from(detection) {
                Ok(region) => regions.push(region),
                Err(e) => warn!(
                    "Skipping malformed detection {} on line {}: {}",
                    index, line_index, e
                ),
            }
        }
    }

    regions
}
