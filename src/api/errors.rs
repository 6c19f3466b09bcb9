// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error taxonomy for the OCR endpoints and its mapping onto HTTP

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::vision::ocr::EngineError;
use crate::vision::ImageError;

/// Failure categories surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Declared content type is not an accepted image type
    InvalidContentType,
    /// Uploaded file exceeds the per-file limit
    PayloadTooLarge,
    /// Bytes could not be decoded as an image
    DecodeFailure,
    /// Engine initialization or inference failed
    EngineFailure,
    /// No file part in the request, or the body is not multipart
    MissingUpload,
}

impl ErrorKind {
    /// Whether the client caused this error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidContentType | ErrorKind::PayloadTooLarge | ErrorKind::MissingUpload
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidContentType => "invalid_content_type",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::EngineFailure => "engine_failure",
            ErrorKind::MissingUpload => "missing_upload",
        };
        f.write_str(name)
    }
}

/// A failure of one pipeline stage, carrying its client-facing message
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Body returned for every failed request or batch item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_content_type(declared: Option<&str>, allowed: &[&str]) -> Self {
        Self::new(
            ErrorKind::InvalidContentType,
            format!(
                "Unsupported file type: {}. Allowed: {}",
                declared.unwrap_or("none"),
                allowed.join(", ")
            ),
        )
    }

    pub fn payload_too_large(size: usize, limit: usize) -> Self {
        Self::new(
            ErrorKind::PayloadTooLarge,
            format!("File too large: {} bytes (max: {} bytes)", size, limit),
        )
    }

    /// Whole request body exceeded the server limit before a file was read
    pub fn request_too_large() -> Self {
        Self::new(ErrorKind::PayloadTooLarge, "Request body too large")
    }

    pub fn decode_failure(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DecodeFailure,
            format!("OCR processing failed: {}", reason),
        )
    }

    pub fn engine_failure(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::EngineFailure,
            format!("OCR processing failed: {}", reason),
        )
    }

    pub fn missing_upload(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingUpload, reason)
    }

    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::InvalidContentType => 400,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::MissingUpload => 422,
            ErrorKind::DecodeFailure | ErrorKind::EngineFailure => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.message.clone(),
        }
    }
}

impl From<ImageError> for ServiceError {
    fn from(err: ImageError) -> Self {
        ServiceError::decode_failure(err)
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        ServiceError::engine_failure(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
