// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Uploaded image and its validation

use axum::body::Bytes;

use crate::api::errors::ServiceError;

/// Content types accepted for upload, checked against the declared header
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/bmp", "image/gif"];

/// Maximum size of one uploaded file (10MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// One uploaded file, consumed by a single request
///
/// `size` is the byte length of the upload as received. For uploads over
/// `MAX_UPLOAD_BYTES` only a prefix is kept in `data`, which validation
/// rejects before anything reads it.
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
    size: usize,
}

impl ImageSubmission {
    pub fn new(filename: Option<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            filename,
            content_type,
            size: data.len(),
            data,
        }
    }

    /// Upload of `size` bytes of which only `prefix` was kept
    pub fn truncated(
        filename: Option<String>,
        content_type: Option<String>,
        prefix: impl Into<Bytes>,
        size: usize,
    ) -> Self {
        let data = prefix.into();
        Self {
            filename,
            content_type,
            size: size.max(data.len()),
            data,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check the declared content type, then the size
    ///
    /// The bytes are not sniffed: a client declaring `image/png` passes this
    /// check whatever it sends, and bad bytes fail later at decode.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.content_type_allowed() {
            return Err(ServiceError::invalid_content_type(
                self.content_type(),
                ALLOWED_CONTENT_TYPES,
            ));
        }

        if self.len() > MAX_UPLOAD_BYTES {
            return Err(ServiceError::payload_too_large(self.len(), MAX_UPLOAD_BYTES));
        }

        Ok(())
    }

    /// Exact match against the allowed list, as declared by the client
    fn content_type_allowed(&self) -> bool {
        self.content_type()
            .is_some_and(|declared| ALLOWED_CONTENT_TYPES.contains(&declared))
    }
}
