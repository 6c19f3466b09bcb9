// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the PaddleOCR models

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;

/// Longest side of the detection input
pub const DET_LIMIT_SIDE_LEN: u32 = 960;

/// Detection input sides are multiples of this
const DET_STRIDE: u32 = 32;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Minimum (padded) recognition input width
pub const REC_MIN_WIDTH: u32 = 320;

/// Angle classifier input size
pub const CLS_INPUT_HEIGHT: u32 = 48;
pub const CLS_INPUT_WIDTH: u32 = 192;

/// Mean values for detection normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Scale factors between the original image and the detection input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionScale {
    pub ratio_w: f32,
    pub ratio_h: f32,
    pub original_width: u32,
    pub original_height: u32,
}

impl DetectionScale {
    /// Map a point from detection-input space back to the original image,
    /// clamped to the image bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> [f32; 2] {
        let max_x = self.original_width.saturating_sub(1) as f32;
        let max_y = self.original_height.saturating_sub(1) as f32;
        [
            (x / self.ratio_w).clamp(0.0, max_x),
            (y / self.ratio_h).clamp(0.0, max_y),
        ]
    }
}

/// Target size for the detection input: longest side capped at
/// `DET_LIMIT_SIDE_LEN`, both sides rounded to a multiple of 32
pub fn detection_size(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height).max(1);
    let ratio = if longest > DET_LIMIT_SIDE_LEN {
        DET_LIMIT_SIDE_LEN as f32 / longest as f32
    } else {
        1.0
    };

    let round = |side: u32| {
        let scaled = (side as f32 * ratio).round() as u32;
        (((scaled as f32 / DET_STRIDE as f32).round() as u32) * DET_STRIDE).max(DET_STRIDE)
    };

    (round(width), round(height))
}

/// Resize and normalize an image into a [1, 3, H, W] detection tensor
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, DetectionScale) {
    let (orig_w, orig_h) = image.dimensions();
    let (target_w, target_h) = detection_size(orig_w, orig_h);

    let rgb = image
        .resize_exact(target_w, target_h, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::zeros((1, 3, target_h as usize, target_w as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    let scale = DetectionScale {
        ratio_w: target_w as f32 / orig_w.max(1) as f32,
        ratio_h: target_h as f32 / orig_h.max(1) as f32,
        original_width: orig_w,
        original_height: orig_h,
    };

    (tensor, scale)
}

/// Resize a crop to `height`, keeping aspect ratio, and write it into a
/// zero-padded [1, 3, height, padded_width] tensor normalized to [-1, 1]
fn fixed_height_tensor(
    image: &DynamicImage,
    height: u32,
    padded_width: u32,
    max_width: Option<u32>,
) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();
    let ratio = orig_w.max(1) as f32 / orig_h.max(1) as f32;

    let mut resized_w = ((height as f32 * ratio).ceil() as u32).max(1);
    if let Some(max) = max_width {
        resized_w = resized_w.min(max);
    }
    let tensor_w = padded_width.max(resized_w);

    let rgb = image
        .resize_exact(resized_w, height, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::zeros((1, 3, height as usize, tensor_w as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - 0.5) / 0.5;
        }
    }

    tensor
}

/// Recognition tensor: height 48, width grows with the crop, padded to at
/// least 320
pub fn preprocess_for_recognition(crop: &DynamicImage) -> Array4<f32> {
    fixed_height_tensor(crop, REC_INPUT_HEIGHT, REC_MIN_WIDTH, None)
}

/// Angle classifier tensor: fixed 48x192
pub fn preprocess_for_classification(crop: &DynamicImage) -> Array4<f32> {
    fixed_height_tensor(
        crop,
        CLS_INPUT_HEIGHT,
        CLS_INPUT_WIDTH,
        Some(CLS_INPUT_WIDTH),
    )
}

/// Crop the axis-aligned extent of a quad. Tall crops are rotated so the
/// text runs horizontally.
pub fn crop_quad(image: &DynamicImage, quad: &[[f32; 2]; 4]) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();

    let min_x = quad.iter().map(|p| p[0]).fold(f32::MAX, f32::min).max(0.0);
    let min_y = quad.iter().map(|p| p[1]).fold(f32::MAX, f32::min).max(0.0);
    let max_x = quad.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
    let max_y = quad.iter().map(|p| p[1]).fold(f32::MIN, f32::max);

    let x = min_x.floor() as u32;
    let y = min_y.floor() as u32;
    if x >= img_w || y >= img_h {
        return None;
    }

    let w = ((max_x.ceil() as u32).saturating_sub(x)).min(img_w - x);
    let h = ((max_y.ceil() as u32).saturating_sub(y)).min(img_h - y);
    if w == 0 || h == 0 {
        return None;
    }

    let crop = image.crop_imm(x, y, w, h);
    if h as f32 / w as f32 >= 1.5 {
        Some(crop.rotate90())
    } else {
        Some(crop)
    }
}
