//! Resizer metadata index
//!
//! Persists one row per rendered result and answers the two cache lookups of the resize
//! pipeline: by validated key (request as phrased) and by normalized key (request resolved
//! against the decoded source size).

pub mod db;

pub use db::{CacheStore, MemoryCacheStore, PostgresCacheRepository};
