// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR engine running the ONNX exports of the PP-OCR models on CPU
//!
//! Expected files in the model directory:
//! - det_model.onnx (text detection)
//! - rec_model.onnx (text recognition)
//! - ppocr_keys_v1.txt (character dictionary)
//! - cls_model.onnx (optional, 180° angle classification)

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::classification::AngleClassifier;
use super::detection::TextDetector;
use super::engine::{EngineFactory, OcrEngine, RawDetection, RawOcrOutput};
use super::preprocessing::crop_quad;
use super::recognition::TextRecognizer;

pub const DET_MODEL_FILE: &str = "det_model.onnx";
pub const REC_MODEL_FILE: &str = "rec_model.onnx";
pub const CLS_MODEL_FILE: &str = "cls_model.onnx";
pub const DICT_FILE: &str = "ppocr_keys_v1.txt";

/// Recognitions scoring below this are dropped
const DROP_SCORE: f32 = 0.5;

/// Load an ONNX model with CPU-only execution
pub(crate) fn load_session(model_path: &Path, what: &str) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("OCR {} model not found: {}", what, model_path.display());
    }

    info!("Loading OCR {} model from {}", what, model_path.display());

    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| {
            format!(
                "Failed to load OCR {} model from {}",
                what,
                model_path.display()
            )
        })
}

#[derive(Debug)]
pub struct PaddleOcrEngine {
    detector: TextDetector,
    recognizer: TextRecognizer,
    classifier: Option<AngleClassifier>,
}

impl PaddleOcrEngine {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let detector = TextDetector::load(&model_dir.join(DET_MODEL_FILE))?;
        let recognizer =
            TextRecognizer::load(&model_dir.join(REC_MODEL_FILE), &model_dir.join(DICT_FILE))?;

        let cls_path = model_dir.join(CLS_MODEL_FILE);
        let classifier = if cls_path.exists() {
            Some(AngleClassifier::load(&cls_path)?)
        } else {
            warn!(
                "No angle classifier at {}, angle classification disabled",
                cls_path.display()
            );
            None
        };

        Ok(Self {
            detector,
            recognizer,
            classifier,
        })
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn recognize(&self, image: &DynamicImage, use_angle_cls: bool) -> Result<RawOcrOutput> {
        let quads = self.detector.detect(image)?;
        if quads.is_empty() {
            return Ok(RawOcrOutput::empty());
        }

        let mut detections = Vec::with_capacity(quads.len());
        for quad in &quads {
            let Some(mut crop) = crop_quad(image, &quad.points) else {
                debug!("Skipping region outside image bounds: {:?}", quad.points);
                continue;
            };

            if use_angle_cls {
                if let Some(classifier) = &self.classifier {
                    if classifier.is_rotated(&crop)? {
                        crop = crop.rotate180();
                    }
                }
            }

            let recognized = self.recognizer.recognize(&crop)?;
            if recognized.confidence < DROP_SCORE {
                continue;
            }

            detections.push(RawDetection::new(
                quad.points
                    .iter()
                    .map(|p| [p[0] as f64, p[1] as f64])
                    .collect(),
                recognized.text,
                recognized.confidence as f64,
            ));
        }

        if detections.is_empty() {
            Ok(RawOcrOutput::empty())
        } else {
            Ok(RawOcrOutput::single_line(detections))
        }
    }
}

/// Loads `PaddleOcrEngine` from a model directory
#[derive(Debug, Clone)]
pub struct PaddleEngineFactory {
    model_dir: PathBuf,
}

impl PaddleEngineFactory {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

impl EngineFactory for PaddleEngineFactory {
    fn create(&self) -> Result<Arc<dyn OcrEngine>> {
        if !self.model_dir.is_dir() {
            anyhow::bail!(
                "OCR model directory not found: {}",
                self.model_dir.display()
            );
        }

        let engine = PaddleOcrEngine::load(&self.model_dir)?;
        info!(
            "PaddleOCR engine loaded from {} (angle classifier: {})",
            self.model_dir.display(),
            engine.has_classifier()
        );
        Ok(Arc::new(engine))
    }

    fn name(&self) -> &str {
        "paddleocr"
    }
}
