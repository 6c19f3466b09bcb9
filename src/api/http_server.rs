// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{health_handler, root_handler, DOCS_URL, OPENAPI_URL};
use super::ocr::{batch_ocr_handler, ocr_handler, OcrPipeline};
use crate::config::{ServiceConfig, DEFAULT_MAX_REQUEST_BYTES};
use crate::vision::ocr::{OcrEngineAdapter, StubEngineFactory};

/// Shared state for all handlers. The single engine adapter lives behind
/// the pipeline and is created once per process.
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: OcrPipeline,
    pub max_request_bytes: usize,
}

impl AppState {
    pub fn new(adapter: Arc<OcrEngineAdapter>, max_request_bytes: usize) -> Self {
        Self {
            pipeline: OcrPipeline::new(adapter),
            max_request_bytes,
        }
    }

    /// State backed by the stub engine, for tests and local smoke runs
    pub fn new_for_test() -> Self {
        let adapter = OcrEngineAdapter::new(Arc::new(StubEngineFactory::new()), true);
        Self::new(Arc::new(adapter), DEFAULT_MAX_REQUEST_BYTES)
    }
}

/// `max_request_bytes` caps the body of `/ocr` only. `/batch_ocr` is
/// uncapped and bounds memory per part, so one oversized file fails alone.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_request_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(
            "/ocr",
            post(ocr_handler).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/batch_ocr",
            post(batch_ocr_handler).layer(DefaultBodyLimit::disable()),
        )
        .merge(SwaggerUi::new(DOCS_URL).url(OPENAPI_URL, ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn start_server(config: &ServiceConfig, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("OCR API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("OCR API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
