// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Reads the text in a single cropped region using CTC decoding over the
//! character dictionary.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::ArrayView2;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use super::paddle::load_session;
use super::preprocessing::preprocess_for_recognition;

/// Text read from one region
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters, 0.0 when empty
    pub confidence: f32,
}

pub struct TextRecognizer {
    session: Mutex<Session>,
    input_name: String,
    /// Index 0 is the CTC blank
    dictionary: Vec<String>,
}

impl std::fmt::Debug for TextRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRecognizer")
            .field("input_name", &self.input_name)
            .field("dictionary_size", &self.dictionary.len())
            .finish_non_exhaustive()
    }
}

impl TextRecognizer {
    pub fn load(model_path: &Path, dict_path: &Path) -> Result<Self> {
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }
        let contents = fs::read_to_string(dict_path)
            .with_context(|| format!("Failed to read dictionary: {}", dict_path.display()))?;
        let dictionary = parse_dictionary(&contents);

        let session = load_session(model_path, "recognition")?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        tracing::info!(
            "Loaded character dictionary with {} entries",
            dictionary.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            dictionary,
        })
    }

    pub fn recognize(&self, crop: &DynamicImage) -> Result<RecognizedText> {
        let input = preprocess_for_recognition(crop);

        let probs = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("recognition session lock poisoned"))?;

            let input_value = Value::from_array(input).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Recognition inference failed")?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            // [1, T, C] or [T, C]
            let shape = output.shape().to_vec();
            let (steps, classes) = match shape.as_slice() {
                [1, t, c] | [t, c] => (*t, *c),
                other => anyhow::bail!("Unexpected recognition output shape: {:?}", other),
            };
            let probs = output
                .to_shape((steps, classes))
                .context("Failed to reshape recognition output")?
                .to_owned();
            probs
        };

        Ok(ctc_decode(probs.view(), &self.dictionary))
    }
}

/// One entry per line, blank at index 0 and a trailing space character
pub fn parse_dictionary(contents: &str) -> Vec<String> {
    let mut dictionary = vec![String::new()];
    dictionary.extend(
        contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    );
    dictionary.push(" ".to_string());
    dictionary
}

/// Greedy CTC decoding: best class per step, repeats collapsed, blanks
/// dropped
pub fn ctc_decode(probs: ArrayView2<f32>, dictionary: &[String]) -> RecognizedText {
    let mut text = String::new();
    let mut scores = Vec::new();
    let mut previous: Option<usize> = None;

    for step in probs.rows() {
        let Some((index, &score)) = step
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
        else {
            continue;
        };

        if index != 0 && previous != Some(index) {
            if let Some(ch) = dictionary.get(index) {
                text.push_str(ch);
                scores.push(score);
            }
        }
        previous = Some(index);
    }

    let confidence = if scores.is_empty() {
        0.0
    } else {
        (scores.iter().sum::<f32>() / scores.len() as f32).clamp(0.0, 1.0)
    };

    RecognizedText { text, confidence }
}
