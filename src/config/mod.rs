// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every setting can be given as a command-line flag or an environment
//! variable (a `.env` file is loaded first by the binary).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ocr::MAX_UPLOAD_BYTES;
use crate::vision::ocr::{EngineFactory, PaddleEngineFactory, StubEngineFactory};

/// Default transport-level body cap (64MB)
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Which recognition engine backs the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// PaddleOCR ONNX models on CPU
    Paddle,
    /// Fixed single detection, no models required
    Stub,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-ocr-service")]
#[command(version)]
#[command(about = "PaddleOCR text recognition over HTTP", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Recognition engine
    #[arg(long, env = "OCR_ENGINE", value_enum, default_value_t = EngineKind::Paddle)]
    pub engine: EngineKind,

    /// Directory holding det_model.onnx, rec_model.onnx, ppocr_keys_v1.txt
    /// and optionally cls_model.onnx
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub model_dir: PathBuf,

    /// Run angle classification on detected regions
    #[arg(long, env = "OCR_USE_ANGLE_CLS", default_value_t = true, action = ArgAction::Set)]
    pub use_angle_cls: bool,

    /// Initialize the engine at startup instead of on the first request
    #[arg(long, env = "OCR_WARMUP", default_value_t = false, action = ArgAction::Set)]
    pub warmup: bool,

    /// Maximum request body size in bytes for `/ocr`; `/batch_ocr` is capped per file
    #[arg(long, env = "MAX_REQUEST_BYTES", default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            engine: EngineKind::Paddle,
            model_dir: PathBuf::from("./models/paddleocr-onnx"),
            use_angle_cls: true,
            warmup: false,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Check settings that clap cannot express
    pub fn validate(&self) -> Result<()> {
        // Oversized files must reach the validator to be answered with 413
        if self.max_request_bytes <= MAX_UPLOAD_BYTES {
            anyhow::bail!(
                "max_request_bytes ({}) must be larger than the per-file limit of {} bytes",
                self.max_request_bytes,
                MAX_UPLOAD_BYTES
            );
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Build the factory for the configured engine. Nothing is loaded here.
    pub fn engine_factory(&self) -> Arc<dyn EngineFactory> {
        match self.engine {
            EngineKind::Paddle => Arc::new(PaddleEngineFactory::new(&self.model_dir)),
            EngineKind::Stub => Arc::new(StubEngineFactory::new()),
        }
    }
}
