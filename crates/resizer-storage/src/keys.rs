//! Object name validation shared by storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject names that are empty, absolute, or could escape the storage root.
pub fn validate_object_name(object_name: &str) -> StorageResult<()> {
    if object_name.is_empty() {
        return Err(StorageError::InvalidKey("Object name is empty".to_string()));
    }
    if object_name.contains("..") || object_name.starts_with('/') || object_name.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Object name contains invalid characters: {}",
            object_name
        )));
    }
    Ok(())
}

/// `Cache-Control` value attached to uploaded objects.
pub fn cache_control(max_age_secs: u64) -> String {
    format!("max-age={}", max_age_secs)
}
