//! Service initialization

use anyhow::{Context, Result};
use resizer_core::Config;
use resizer_db::CacheStore;
use resizer_storage::Storage;
use resizer_worker::{PersistQueue, PersistQueueConfig, StoreAndIndex};
use std::sync::Arc;
use std::time::Duration;

use crate::services::fetcher::HttpFetcher;
use crate::state::AppState;

pub async fn initialize_services(
    config: &Config,
    store: Arc<dyn CacheStore>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let work_dir = config.fetch_work_dir();
    HttpFetcher::prepare_work_dir(work_dir)
        .await
        .with_context(|| format!("Failed to prepare fetch work dir {}", work_dir.display()))?;
    let fetcher = HttpFetcher::new(
        work_dir.clone(),
        Duration::from_secs(config.fetch_timeout_seconds()),
        config.max_source_size_bytes(),
    )
    .context("Failed to build HTTP client")?;
    tracing::info!(
        work_dir = %work_dir.display(),
        fetch_timeout_seconds = config.fetch_timeout_seconds(),
        max_source_size_bytes = config.max_source_size_bytes(),
        "Source fetcher initialized"
    );

    let handler = Arc::new(StoreAndIndex::new(
        storage.clone(),
        store.clone(),
        config.cache_max_age_seconds(),
    ));
    let persist = PersistQueue::start(
        PersistQueueConfig {
            capacity: config.persist_queue_capacity(),
            max_workers: config.persist_workers(),
            shutdown_grace: Duration::from_secs(config.persist_shutdown_grace_seconds()),
        },
        handler,
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        store,
        storage,
        Arc::new(fetcher),
        Arc::new(persist),
    )))
}
