// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Finds text regions in an image and returns them as 4-point quads in
//! original image coordinates.

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::ArrayView2;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use super::paddle::load_session;
use super::preprocessing::{preprocess_for_detection, DetectionScale};

/// Pixels at or above this probability count as text
const BINARY_THRESHOLD: f32 = 0.3;

/// Minimum mean probability of a region to keep it
const BOX_THRESHOLD: f32 = 0.6;

/// Regions with a shorter side (in probability-map pixels) are noise
const MIN_SIDE: usize = 3;

/// How far to grow a region relative to area / perimeter
const UNCLIP_RATIO: f32 = 1.5;

/// Boxes whose tops differ by less than this are on the same line
const LINE_TOLERANCE: f32 = 10.0;

/// A detected text region
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedQuad {
    /// Corners clockwise from top-left, original image coordinates
    pub points: [[f32; 2]; 4],
    /// Mean text probability inside the region
    pub score: f32,
}

/// Connected region of the binarized probability map, in map pixels
#[derive(Debug, Clone, Copy, PartialEq)]
struct Component {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    score: f32,
}

pub struct TextDetector {
    session: Mutex<Session>,
    input_name: String,
}

impl std::fmt::Debug for TextDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDetector")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl TextDetector {
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = load_session(model_path, "detection")?;
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

    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedQuad>> {
        let (input, scale) = preprocess_for_detection(image);

        let prob_map = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("detection session lock poisoned"))?;

            let input_value = Value::from_array(input).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            // [1, 1, H, W] or [1, H, W]
            let shape = output.shape().to_vec();
            let (h, w) = match shape.as_slice() {
                [1, 1, h, w] | [1, h, w] => (*h, *w),
                other => anyhow::bail!("Unexpected detection output shape: {:?}", other),
            };
            let map = output
                .to_shape((h, w))
                .context("Failed to reshape probability map")?
                .to_owned();
            map
        };

        let quads = quads_from_probability_map(prob_map.view(), &scale);
        debug!("Detected {} text regions", quads.len());
        Ok(quads)
    }
}

/// Turn a probability map into scored quads in original image space,
/// ordered top-to-bottom then left-to-right
pub fn quads_from_probability_map(
    prob_map: ArrayView2<f32>,
    scale: &DetectionScale,
) -> Vec<DetectedQuad> {
    let mut quads: Vec<DetectedQuad> = connected_components(prob_map)
        .into_iter()
        .filter(|c| c.score >= BOX_THRESHOLD)
        .filter(|c| (c.max_x - c.min_x + 1).min(c.max_y - c.min_y + 1) >= MIN_SIDE)
        .map(|c| {
            let (x0, y0, x1, y1) = unclip(&c);
            DetectedQuad {
                points: [
                    scale.map_to_original(x0, y0),
                    scale.map_to_original(x1, y0),
                    scale.map_to_original(x1, y1),
                    scale.map_to_original(x0, y1),
                ],
                score: c.score,
            }
        })
        .collect();

    sort_reading_order(&mut quads);
    quads
}

/// Grow a component's box by area * ratio / perimeter on every side
fn unclip(c: &Component) -> (f32, f32, f32, f32) {
    let w = (c.max_x - c.min_x + 1) as f32;
    let h = (c.max_y - c.min_y + 1) as f32;
    let distance = w * h * UNCLIP_RATIO / (2.0 * (w + h));

    (
        c.min_x as f32 - distance,
        c.min_y as f32 - distance,
        c.max_x as f32 + 1.0 + distance,
        c.max_y as f32 + 1.0 + distance,
    )
}

/// 4-connected components of pixels at or above `BINARY_THRESHOLD`
fn connected_components(prob_map: ArrayView2<f32>) -> Vec<Component> {
    let (height, width) = prob_map.dim();
    let mut visited = vec![false; width * height];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            if visited[start_y * width + start_x]
                || prob_map[[start_y, start_x]] < BINARY_THRESHOLD
            {
                continue;
            }

            let mut component = Component {
                min_x: start_x,
                max_x: start_x,
                min_y: start_y,
                max_y: start_y,
                score: 0.0,
            };
            let mut sum = 0.0f32;
            let mut count = 0usize;

            visited[start_y * width + start_x] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                sum += prob_map[[y, x]];
                count += 1;
                component.min_x = component.min_x.min(x);
                component.max_x = component.max_x.max(x);
                component.min_y = component.min_y.min(y);
                component.max_y = component.max_y.max(y);

                let neighbours = [
                    (x.wrapping_sub(1), y),
                    (x + 1, y),
                    (x, y.wrapping_sub(1)),
                    (x, y + 1),
                ];
                for (nx, ny) in neighbours {
                    if nx < width
                        && ny < height
                        && !visited[ny * width + nx]
                        && prob_map[[ny, nx]] >= BINARY_THRESHOLD
                    {
                        visited[ny * width + nx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            component.score = sum / count as f32;
            components.push(component);
        }
    }

    components
}

fn sort_reading_order(quads: &mut [DetectedQuad]) {
    quads.sort_by(|a, b| {
        a.points[0][1]
            .total_cmp(&b.points[0][1])
            .then(a.points[0][0].total_cmp(&b.points[0][0]))
    });

    // Boxes on roughly the same line read left to right
    for i in 1..quads.len() {
        let mut j = i;
        while j > 0 {
            let (prev, cur) = (&quads[j - 1].points[0], &quads[j].points[0]);
            if (cur[1] - prev[1]).abs() < LINE_TOLERANCE && cur[0] < prev[0] {
                quads.swap(j - 1, j);
                j -= 1;
            } else {
                break;
            }
        }
    }
}
