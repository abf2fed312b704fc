use crate::db::store::CacheStore;
use async_trait::async_trait;
use chrono::Utc;
use resizer_core::{CacheRecord, NewCacheRecord, NormalizedKey, ResizerResult, ValidatedKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Index {
    records: Vec<CacheRecord>,
    by_validated: HashMap<ValidatedKey, usize>,
    by_normalized: HashMap<NormalizedKey, usize>,
}

/// In-process cache store. Records live as long as the process.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    index: Arc<RwLock<Index>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every record, oldest first.
    pub async fn records(&self) -> Vec<CacheRecord> {
        self.index.read().await.records.clone()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn find_by_validated(&self, key: &ValidatedKey) -> ResizerResult<Option<CacheRecord>> {
        let index = self.index.read().await;
        Ok(index
            .by_validated
            .get(key)
            .map(|&position| index.records[position].clone()))
    }

    async fn find_by_normalized(
        &self,
        key: &NormalizedKey,
    ) -> ResizerResult<Option<CacheRecord>> {
        let index = self.index.read().await;
        Ok(index
            .by_normalized
            .get(key)
            .map(|&position| index.records[position].clone()))
    }

    async fn insert(&self, record: NewCacheRecord) -> ResizerResult<CacheRecord> {
        let mut index = self.index.write().await;
        if let Some(&position) = index.by_validated.get(&record.validated) {
            return Ok(index.records[position].clone());
        }

        let created = CacheRecord::from_new(Uuid::new_v4(), record, Utc::now());
        let position = index.records.len();
        index
            .by_validated
            .insert(created.validated.clone(), position);
        index
            .by_normalized
            .entry(created.normalized.clone())
            .or_insert(position);
        index.records.push(created.clone());

        tracing::debug!(
            record_id = %created.id,
            object_name = %created.object_name,
            "Cache record stored in memory"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resizer_core::{
        validate, Dimension, HostPolicy, NormalizedFingerprint, RawQuery, ValidatedRequest,
    };

    fn request(width: Option<&str>) -> ValidatedRequest {
        let raw = RawQuery {
            url: Some("https://example.com/photo.png".into()),
            width: width.map(Into::into),
            height: Some("10".into()),
            format: Some("png".into()),
            ..Default::default()
        };
        validate(&raw, &HostPolicy::allow_all()).unwrap()
    }

    fn record_for(request: &ValidatedRequest) -> NewCacheRecord {
        NewCacheRecord {
            url: request.url.to_string(),
            validated: request.validated_key(),
            normalized: NormalizedKey {
                fingerprint: NormalizedFingerprint::derive(&request.fingerprint, 10, 14),
                dest_width: 7,
                dest_height: 10,
                method: request.method,
                format: request.format,
                quality: request.quality,
            },
            etag: "abc".to_string(),
            object_name: request.object_name("resized/"),
            content_type: "image/png".to_string(),
            canvas_width: 7,
            canvas_height: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryCacheStore::new();
        let req = request(None);
        let new = record_for(&req);

        assert!(store.is_empty().await);
        assert!(store
            .find_by_validated(&req.validated_key())
            .await
            .unwrap()
            .is_none());

        let created = store.insert(new.clone()).await.unwrap();
        assert_eq!(created.validated.width, Dimension::Unconstrained);
        assert_eq!(created.created_at, created.updated_at);

        let hit = store
            .find_by_validated(&req.validated_key())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit, created);
        let hit = store
            .find_by_normalized(&new.normalized)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, created.id);
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_per_validated_key() {
        let store = MemoryCacheStore::new();
        let new = record_for(&request(Some("5")));
        let first = store.insert(new.clone()).await.unwrap();
        let second = store.insert(new).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_equivalent_requests_share_normalized_record() {
        let store = MemoryCacheStore::new();
        let unconstrained = request(None);
        let oversized = request(Some("9999"));
        let first = store.insert(record_for(&unconstrained)).await.unwrap();

        assert!(store
            .find_by_validated(&oversized.validated_key())
            .await
            .unwrap()
            .is_none());
        let hit = store
            .find_by_normalized(&record_for(&oversized).normalized)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, first.id);
    }
}
