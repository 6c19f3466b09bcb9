// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lazily-initialized handle to the recognition engine
//!
//! The engine is built on first use and kept for the life of the process.
//! Initialization is serialized: concurrent first requests wait for a single
//! construction and share its outcome. A failed construction leaves the
//! adapter `Uninitialized` so a later request can try again.
//!
//! State machine: `Uninitialized -> Initializing -> Ready`, with
//! `Initializing -> Uninitialized` on failure. `Ready` is terminal.

use image::DynamicImage;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::engine::{EngineFactory, OcrEngine, RawOcrOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Initializing,
            2 => EngineState::Ready,
            _ => EngineState::Uninitialized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    Initialization(String),

    #[error("recognition failed: {0}")]
    Inference(String),
}

/// Resets the state to `Uninitialized` if initialization is abandoned
/// before it completes (the awaiting request was dropped).
struct InitGuard<'a> {
    state: &'a AtomicU8,
    armed: bool,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .store(EngineState::Uninitialized as u8, Ordering::Release);
        }
    }
}

pub struct OcrEngineAdapter {
    factory: Arc<dyn EngineFactory>,
    engine: OnceLock<Arc<dyn OcrEngine>>,
    /// Serializes initialization; holds the most recent failure
    init_lock: Mutex<Option<EngineError>>,
    failed_inits: AtomicU64,
    state: AtomicU8,
    use_angle_cls: bool,
}

impl std::fmt::Debug for OcrEngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngineAdapter")
            .field("factory", &self.factory.name())
            .field("state", &self.state())
            .field("use_angle_cls", &self.use_angle_cls)
            .finish_non_exhaustive()
    }
}

impl OcrEngineAdapter {
    pub fn new(factory: Arc<dyn EngineFactory>, use_angle_cls: bool) -> Self {
        Self {
            factory,
            engine: OnceLock::new(),
            init_lock: Mutex::new(None),
            failed_inits: AtomicU64::new(0),
            state: AtomicU8::new(EngineState::Uninitialized as u8),
            use_angle_cls,
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn use_angle_cls(&self) -> bool {
        self.use_angle_cls
    }

    /// Build the engine now instead of on the first request
    pub async fn warm_up(&self) -> Result<(), EngineError> {
        self.engine().await.map(|_| ())
    }

    /// Run recognition on the blocking pool
    pub async fn recognize(&self, image: DynamicImage) -> Result<RawOcrOutput, EngineError> {
        let engine = self.engine().await?;
        let use_angle_cls = self.use_angle_cls;

        tokio::task::spawn_blocking(move || engine.recognize(&image, use_angle_cls))
            .await
            .map_err(|e| EngineError::Inference(format!("recognition worker failed: {}", e)))?
            .map_err(|e| EngineError::Inference(format!("{:#}", e)))
    }

    /// Get the engine, constructing it if this is the first use
    async fn engine(&self) -> Result<Arc<dyn OcrEngine>, EngineError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }

        let failures_before_wait = self.failed_inits.load(Ordering::Acquire);
        let mut last_failure = self.init_lock.lock().await;

        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }

        // Construction failed while we were waiting: share that outcome
        if self.failed_inits.load(Ordering::Acquire) != failures_before_wait {
            if let Some(err) = last_failure.as_ref() {
                debug!("Engine initialization failed while waiting: {}", err);
                return Err(err.clone());
            }
        }

        self.state
            .store(EngineState::Initializing as u8, Ordering::Release);
        let mut guard = InitGuard {
            state: &self.state,
            armed: true,
        };

        info!("Initializing OCR engine ({})...", self.factory.name());
        let started = Instant::now();
        let factory = self.factory.clone();
        let built = tokio::task::spawn_blocking(move || factory.create()).await;

        let result = match built {
            Ok(Ok(engine)) => Ok(engine),
            Ok(Err(e)) => Err(EngineError::Initialization(format!("{:#}", e))),
            Err(e) => Err(EngineError::Initialization(format!(
                "engine construction did not complete: {}",
                e
            ))),
        };

        guard.armed = false;
        match result {
            Ok(engine) => {
                let engine = self.engine.get_or_init(|| engine).clone();
                *last_failure = None;
                self.state.store(EngineState::Ready as u8, Ordering::Release);
                info!(
                    "✅ OCR engine ready ({}) in {}ms",
                    self.factory.name(),
                    started.elapsed().as_millis()
                );
                Ok(engine)
            }
            Err(err) => {
                error!("OCR engine initialization failed: {}", err);
                *last_failure = Some(err.clone());
                self.failed_inits.fetch_add(1, Ordering::AcqRel);
                self.state
                    .store(EngineState::Uninitialized as u8, Ordering::Release);
                Err(err)
            }
        }
    }
}
