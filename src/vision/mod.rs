// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based text recognition
//!
//! This module provides:
//! - Upload decoding (`image_utils`)
//! - The OCR engine contract, its lazily-initialized adapter and the
//!   normalization of raw engine output (`ocr`)
//!
//! Inference runs on CPU only.

pub mod image_utils;
pub mod ocr;

pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
