//! Storage setup and initialization

use anyhow::{Context, Result};
use resizer_core::Config;
use resizer_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        object_prefix = %config.object_prefix(),
        cache_max_age_seconds = config.cache_max_age_seconds(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
