// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_ocr_service::{
    api::{start_server, AppState},
    config::ServiceConfig,
    version,
    vision::ocr::OcrEngineAdapter,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::parse();
    config.validate()?;

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("  Engine:       {:?}", config.engine);
    println!("  Model dir:    {}", config.model_dir.display());
    println!("  Angle cls:    {}", config.use_angle_cls);
    println!("  Listen:       {}:{}", config.host, config.port);
    println!();

    let adapter = Arc::new(OcrEngineAdapter::new(
        config.engine_factory(),
        config.use_angle_cls,
    ));

    if config.warmup {
        info!("Warming up OCR engine...");
        // A failed warm-up is retried by the first request
        if let Err(e) = adapter.warm_up().await {
            warn!("OCR engine warm-up failed: {}", e);
        }
    } else {
        info!("OCR engine will be initialized on the first request");
    }

    println!("📡 Endpoints:");
    println!("  Health:       GET  http://localhost:{}/health", config.port);
    println!("  OCR:          POST http://localhost:{}/ocr", config.port);
    println!("  Batch OCR:    POST http://localhost:{}/batch_ocr", config.port);
    println!("  API docs:     GET  http://localhost:{}/docs", config.port);
    println!("\nTest with curl:");
    println!(
        "  curl -X POST http://localhost:{}/ocr -F 'file=@scan.png;type=image/png'",
        config.port
    );
    println!("\nPress Ctrl+C to shutdown...\n");

    let state = AppState::new(adapter, config.max_request_bytes);
    start_server(&config, state).await?;

    println!("👋 Goodbye!");
    Ok(())
}
