//! Names for the structured `event` field attached to pipeline log lines.

use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogEvent {
    ServerStart,
    DatabaseInitializing,
    RequestValidated,
    ValidatedCacheHit,
    ValidatedCacheMiss,
    SourceFetched,
    SourceReleased,
    SourcePreprocessed,
    NormalizedCacheHit,
    NormalizedCacheMiss,
    Resized,
    PersistQueued,
    PersistDropped,
    Uploaded,
    RecordCreated,
    PersistFailed,
}

impl LogEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            LogEvent::ServerStart => "SERVER_START",
            LogEvent::DatabaseInitializing => "DATABASE_INITIALIZING",
            LogEvent::RequestValidated => "REQUEST_VALIDATED",
            LogEvent::ValidatedCacheHit => "VALIDATED_CACHE_HIT",
            LogEvent::ValidatedCacheMiss => "VALIDATED_CACHE_MISS",
            LogEvent::SourceFetched => "SOURCE_FETCHED",
            LogEvent::SourceReleased => "SOURCE_RELEASED",
            LogEvent::SourcePreprocessed => "SOURCE_PREPROCESSED",
            LogEvent::NormalizedCacheHit => "NORMALIZED_CACHE_HIT",
            LogEvent::NormalizedCacheMiss => "NORMALIZED_CACHE_MISS",
            LogEvent::Resized => "RESIZED",
            LogEvent::PersistQueued => "PERSIST_QUEUED",
            LogEvent::PersistDropped => "PERSIST_DROPPED",
            LogEvent::Uploaded => "UPLOADED",
            LogEvent::RecordCreated => "RECORD_CREATED",
            LogEvent::PersistFailed => "PERSIST_FAILED",
        }
    }
}

impl Display for LogEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
