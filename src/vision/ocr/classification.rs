// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text angle classifier (0° vs 180°)

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

use super::paddle::load_session;
use super::preprocessing::preprocess_for_classification;

/// Minimum probability of the 180° label before a crop is flipped
const CLS_THRESHOLD: f32 = 0.9;

pub struct AngleClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl std::fmt::Debug for AngleClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngleClassifier")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl AngleClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = load_session(model_path, "angle classification")?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Whether the crop is upside down
    pub fn is_rotated(&self, crop: &DynamicImage) -> Result<bool> {
        let input = preprocess_for_classification(crop);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("classifier session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Angle classification failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let probs: Vec<f32> = output.iter().copied().collect();
        Ok(is_flipped(&probs))
    }
}

/// `probs` holds [p(0°), p(180°)]
fn is_flipped(probs: &[f32]) -> bool {
    match probs {
        [p0, p180, ..] => p180 > p0 && *p180 >= CLS_THRESHOLD,
        _ => false,
    }
}
