// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic stand-in engine
//!
//! Returns one fixed detection for every image. Used by the test suite and
//! by `OCR_ENGINE=stub` for smoke-testing a deployment without model files.

use anyhow::Result;
use image::DynamicImage;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::engine::{EngineFactory, OcrEngine, RawDetection, RawOcrOutput};

pub const STUB_TEXT: &str = "TEST";
pub const STUB_CONFIDENCE: f64 = 0.95;
pub const STUB_POLYGON: [[f64; 2]; 4] = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];

const FLAG_UNSET: u8 = 0;
const FLAG_FALSE: u8 = 1;
const FLAG_TRUE: u8 = 2;

#[derive(Debug, Clone)]
pub struct StubEngine {
    response: std::result::Result<RawOcrOutput, String>,
    last_angle_cls: Arc<AtomicU8>,
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StubEngine {
    /// Engine answering with the single fixed "TEST" detection
    pub fn new() -> Self {
        Self::with_output(RawOcrOutput::single_line(vec![RawDetection::new(
            STUB_POLYGON.to_vec(),
            STUB_TEXT,
            STUB_CONFIDENCE,
        )]))
    }

    /// Engine answering with the given raw output
    pub fn with_output(output: RawOcrOutput) -> Self {
        Self {
            response: Ok(output),
            last_angle_cls: Arc::new(AtomicU8::new(FLAG_UNSET)),
        }
    }

    /// Engine whose every recognition fails
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            last_angle_cls: Arc::new(AtomicU8::new(FLAG_UNSET)),
        }
    }
}

impl OcrEngine for StubEngine {
    fn recognize(&self, _image: &DynamicImage, use_angle_cls: bool) -> Result<RawOcrOutput> {
        let flag = if use_angle_cls { FLAG_TRUE } else { FLAG_FALSE };
        self.last_angle_cls.store(flag, Ordering::Release);

        match &self.response {
            Ok(output) => Ok(output.clone()),
            Err(message) => anyhow::bail!("{}", message),
        }
    }
}

/// Factory for `StubEngine` that counts constructions
///
/// Can be told to fail its first N constructions and to sleep during
/// construction, to mimic slow model loading.
#[derive(Debug)]
pub struct StubEngineFactory {
    engine: StubEngine,
    constructions: AtomicUsize,
    failures_remaining: AtomicUsize,
    delay: Duration,
}

impl Default for StubEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StubEngineFactory {
    pub fn new() -> Self {
        Self {
            engine: StubEngine::new(),
            constructions: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_engine(mut self, engine: StubEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::Release);
        self
    }

    /// Number of times `create` has been called
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }

    /// Angle-classification flag seen by the most recent recognition
    pub fn last_angle_cls(&self) -> Option<bool> {
        match self.engine.last_angle_cls.load(Ordering::Acquire) {
            FLAG_TRUE => Some(true),
            FLAG_FALSE => Some(false),
            _ => None,
        }
    }
}

impl EngineFactory for StubEngineFactory {
    fn create(&self) -> Result<Arc<dyn OcrEngine>> {
        self.constructions.fetch_add(1, Ordering::AcqRel);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            anyhow::bail!("stub engine construction failed");
        }

        Ok(Arc::new(self.engine.clone()))
    }

    fn name(&self) -> &str {
        "stub"
    }
}
