//! Domain models for resize requests and persisted cache records.

pub mod record;
pub mod request;

pub use record::{CacheRecord, NewCacheRecord, NormalizedKey, ValidatedKey};
pub use request::{Dimension, FitMethod, OutputFormat, ValidatedRequest};
