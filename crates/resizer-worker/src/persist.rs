use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use resizer_core::{LogEvent, NewCacheRecord};
use resizer_db::CacheStore;
use resizer_storage::Storage;
use std::sync::Arc;

use crate::context::PersistHandler;

/// A rendered image waiting to be stored.
#[derive(Debug, Clone)]
pub struct PersistJob {
    pub bytes: Bytes,
    pub record: NewCacheRecord,
}

/// Uploads the blob, then inserts its metadata row. A failed upload never produces a row.
pub struct StoreAndIndex {
    storage: Arc<dyn Storage>,
    store: Arc<dyn CacheStore>,
    max_age_secs: u64,
}

impl StoreAndIndex {
    pub fn new(storage: Arc<dyn Storage>, store: Arc<dyn CacheStore>, max_age_secs: u64) -> Self {
        Self {
            storage,
            store,
            max_age_secs,
        }
    }
}

#[async_trait]
impl PersistHandler for StoreAndIndex {
    async fn handle(&self, job: PersistJob) -> Result<()> {
        let PersistJob { bytes, record } = job;
        let size_bytes = bytes.len();

        let url = self
            .storage
            .put(
                &record.object_name,
                bytes,
                &record.content_type,
                self.max_age_secs,
            )
            .await
            .with_context(|| format!("Failed to upload {}", record.object_name))?;

        tracing::info!(
            event = %LogEvent::Uploaded,
            object_name = %record.object_name,
            size_bytes = size_bytes,
            url = %url,
            "Rendered image uploaded"
        );

        let created = self
            .store
            .insert(record)
            .await
            .context("Failed to insert cache record")?;

        tracing::info!(
            event = %LogEvent::RecordCreated,
            record_id = %created.id,
            validated_hash = %created.validated.fingerprint,
            normalized_hash = %created.normalized.fingerprint,
            object_name = %created.object_name,
            "Cache record created"
        );

        Ok(())
    }
}
