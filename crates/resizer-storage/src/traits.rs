//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use resizer_core::ResizerError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for ResizerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => ResizerError::Internal(format!("storage: {}", msg)),
            other => ResizerError::DependencyUnavailable(format!("storage: {}", other)),
        }
    }
}

/// Blob store for rendered images.
///
/// Uploads are idempotent per object name: writing the same name twice replaces the
/// object with identical bytes, since names are derived from the request.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `object_name` and return its public URL.
    ///
    /// `max_age_secs` becomes the object's `Cache-Control` where the backend supports
    /// object metadata.
    async fn put(
        &self,
        object_name: &str,
        data: Bytes,
        content_type: &str,
        max_age_secs: u64,
    ) -> StorageResult<String>;

    /// Public URL of an object, whether or not it exists.
    fn public_url(&self, object_name: &str) -> String;

    /// Check if an object exists
    async fn exists(&self, object_name: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
