// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handlers

use axum::body::Bytes;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum_extra::extract::Multipart;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::request::{ImageSubmission, MAX_UPLOAD_BYTES};
use super::response::{BatchOcrResponse, OcrResponse};
use crate::api::errors::{ErrorResponse, ServiceError};
use crate::api::http_server::AppState;

/// Form field carrying the image for `/ocr`
pub const SINGLE_FIELD: &str = "file";
/// Form field carrying the images for `/batch_ocr`, repeated once per file
pub const BATCH_FIELD: &str = "files";

/// Multipart body of `/ocr`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct OcrUpload {
    /// Image as `image/jpeg`, `image/png`, `image/bmp` or `image/gif`
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Multipart body of `/batch_ocr`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BatchOcrUpload {
    /// One part per image, all named `files`
    #[schema(value_type = Vec<String>)]
    files: Vec<Vec<u8>>,
}

/// POST /ocr - Extract text from one uploaded image
///
/// # Request
/// `multipart/form-data` with the image in the `file` part. The part's
/// declared content type must be one of `image/jpeg`, `image/png`,
/// `image/bmp`, `image/gif`.
///
/// # Response
/// - `success`: always `true`
/// - `data`: recognized regions as `{text, confidence, bbox}`
/// - `count`: number of regions
/// - `processing_time_ms`: wall time, 2 decimals
///
/// # Errors
/// - 400 Bad Request: unsupported content type
/// - 413 Payload Too Large: file over 10MB, or body over the request cap
/// - 422 Unprocessable Entity: no file part
/// - 500 Internal Server Error: decode or engine failure
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    request_body(content = OcrUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recognized text regions", body = OcrResponse),
        (status = 400, description = "Unsupported content type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "No file part", body = ErrorResponse),
        (status = 500, description = "Decode or engine failure", body = ErrorResponse)
    )
)]
pub async fn ocr_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>, ServiceError> {
    let mut uploads = read_uploads(multipart, SINGLE_FIELD).await?;
    if uploads.is_empty() {
        return Err(ServiceError::missing_upload(format!(
            "Missing required form field: {}",
            SINGLE_FIELD
        )));
    }
    if uploads.len() > 1 {
        debug!("{} file parts received, using the first", uploads.len());
    }

    let submission = uploads.swap_remove(0);
    let result = state.pipeline.process(submission).await?;

    Ok(Json(result.into()))
}

/// POST /batch_ocr - Extract text from several uploaded images
///
/// Each file is processed independently; a failing file yields an error
/// entry in its position rather than failing the request. The endpoint
/// always answers 200 once at least one file was received. An oversized
/// file is answered with a per-item 413 body; the request itself has no
/// body cap.
#[utoipa::path(
    post,
    path = "/batch_ocr",
    tag = "ocr",
    request_body(content = BatchOcrUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "One result per file, in upload order", body = BatchOcrResponse),
        (status = 422, description = "No file parts", body = ErrorResponse)
    )
)]
pub async fn batch_ocr_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchOcrResponse>, ServiceError> {
    let uploads = read_uploads(multipart, BATCH_FIELD).await?;
    if uploads.is_empty() {
        return Err(ServiceError::missing_upload(format!(
            "Missing required form field: {}",
            BATCH_FIELD
        )));
    }

    debug!("Batch OCR request with {} files", uploads.len());
    let items = state.pipeline.process_batch(uploads).await;

    Ok(Json(items.into()))
}

/// Collect uploaded files from a multipart body
///
/// Parts named `field_name` win. When there are none, every part that
/// carries a filename is used instead. Order follows the body.
async fn read_uploads(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
) -> Result<Vec<ImageSubmission>, ServiceError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Multipart rejected: {}", rejection);
        ServiceError::missing_upload(format!("Expected multipart/form-data: {}", rejection))
    })?;

    let mut named = Vec::new();
    let mut with_filename = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let (data, size) = read_capped(&mut field).await?;

        debug!(
            "Received part '{}' ({:?}, {:?}, {} bytes)",
            name, filename, content_type, size
        );

        let has_filename = filename.is_some();
        let submission = ImageSubmission::truncated(filename, content_type, data, size);
        if name == field_name {
            named.push(submission);
        } else if has_filename {
            with_filename.push(submission);
        }
    }

    Ok(if named.is_empty() { with_filename } else { named })
}

/// Read a part to the end, keeping at most `MAX_UPLOAD_BYTES + 1` bytes
///
/// Returns the kept bytes and the full length of the part. The kept bytes
/// are the whole part whenever it is within the upload limit.
async fn read_capped(field: &mut Field) -> Result<(Bytes, usize), ServiceError> {
    let keep = MAX_UPLOAD_BYTES + 1;
    let mut kept: Vec<u8> = Vec::new();
    let mut size = 0usize;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size = size.saturating_add(chunk.len());
        let room = keep.saturating_sub(kept.len());
        if room > 0 {
            kept.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
    }

    if size > MAX_UPLOAD_BYTES {
        debug!("Part over upload limit: {} bytes, discarded", size);
    }
    Ok((Bytes::from(kept), size))
}

fn multipart_error(err: MultipartError) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Request body over limit: {}", err);
        return ServiceError::request_too_large();
    }
    warn!("Malformed multipart body: {}", err);
    ServiceError::missing_upload(format!("Malformed multipart body: {}", err.body_text()))
}
