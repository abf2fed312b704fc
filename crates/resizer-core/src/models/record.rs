use crate::fingerprint::{NormalizedFingerprint, ValidatedFingerprint};
use crate::models::request::{Dimension, FitMethod, OutputFormat};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tier-1 lookup key: the request as the client phrased it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedKey {
    pub fingerprint: ValidatedFingerprint,
    pub width: Dimension,
    pub height: Dimension,
    pub method: FitMethod,
    pub format: OutputFormat,
    pub quality: u8,
}

/// Tier-2 lookup key: the request resolved against the decoded source size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey {
    pub fingerprint: NormalizedFingerprint,
    pub dest_width: u32,
    pub dest_height: u32,
    pub method: FitMethod,
    pub format: OutputFormat,
    pub quality: u8,
}

/// Everything known about a rendered result before the store assigns an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCacheRecord {
    pub url: String,
    pub validated: ValidatedKey,
    pub normalized: NormalizedKey,
    pub etag: String,
    pub object_name: String,
    pub content_type: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// A persisted rendering. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub id: Uuid,
    pub url: String,
    pub validated: ValidatedKey,
    pub normalized: NormalizedKey,
    pub etag: String,
    pub object_name: String,
    pub content_type: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    pub fn from_new(id: Uuid, record: NewCacheRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            url: record.url,
            validated: record.validated,
            normalized: record.normalized,
            etag: record.etag,
            object_name: record.object_name,
            content_type: record.content_type,
            canvas_width: record.canvas_width,
            canvas_height: record.canvas_height,
            created_at: now,
            updated_at: now,
        }
    }
}
