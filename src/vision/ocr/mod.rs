// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine integration
//!
//! Components:
//! - `engine` - Engine contract and raw output shape
//! - `adapter` - Lazily-initialized, shared engine handle
//! - `model` / `formatter` - Normalized results and raw output conversion
//! - `paddle` - PaddleOCR ONNX engine (`detection`, `recognition`,
//!   `classification`, `preprocessing`)
//! - `stub` - Fixed-output engine for tests and smoke runs

pub mod adapter;
pub mod classification;
pub mod detection;
pub mod engine;
pub mod formatter;
pub mod model;
pub mod paddle;
pub mod preprocessing;
pub mod recognition;
pub mod stub;

pub use adapter::{EngineError, EngineState, OcrEngineAdapter};
pub use engine::{EngineFactory, OcrEngine, RawDetection, RawOcrOutput};
pub use formatter::format_regions;
pub use model::{OcrResult, RecognizedTextRegion, RegionError};
pub use paddle::{PaddleEngineFactory, PaddleOcrEngine};
pub use stub::{StubEngine, StubEngineFactory};
