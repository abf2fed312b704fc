use async_trait::async_trait;
use resizer_core::{CacheRecord, NewCacheRecord, NormalizedKey, ResizerResult, ValidatedKey};

/// Metadata index of rendered images.
///
/// Records are immutable. `insert` is idempotent on the validated key: when a record for
/// the same key already exists, that record is returned unchanged.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn find_by_validated(&self, key: &ValidatedKey) -> ResizerResult<Option<CacheRecord>>;

    async fn find_by_normalized(&self, key: &NormalizedKey)
        -> ResizerResult<Option<CacheRecord>>;

    async fn insert(&self, record: NewCacheRecord) -> ResizerResult<CacheRecord>;
}
