//! Resizer Core Library
//!
//! This crate provides the request model, fingerprinting, validation, error types and
//! configuration shared by every resizer component.

pub mod config;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorMetadata, LogLevel, ResizerError, ResizerResult};
pub use events::LogEvent;
pub use fingerprint::{NormalizedFingerprint, ValidatedFingerprint};
pub use models::{
    CacheRecord, Dimension, FitMethod, NewCacheRecord, NormalizedKey, OutputFormat,
    ValidatedKey, ValidatedRequest,
};
pub use storage_types::{MetadataBackend, StorageBackend};
pub use validation::{validate, HostPolicy, RawQuery};
