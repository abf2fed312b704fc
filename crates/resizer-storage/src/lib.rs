//! Resizer Storage Library
//!
//! Blob storage for rendered images, with S3 (or any S3-compatible provider) and local
//! filesystem backends behind the [`Storage`] trait.
//!
//! # Object names
//!
//! Objects are addressed by the deterministic name derived from the validated request,
//! `{prefix}{validated_fingerprint}/{width}x{height}-{method}-q{quality}.{ext}`. Names must not
//! contain `..` or a leading `/`; validation is shared by all backends in the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use resizer_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
