//! Shared application state handed to every handler.

use resizer_core::{Config, HostPolicy};
use resizer_db::CacheStore;
use resizer_storage::Storage;
use resizer_worker::PersistQueue;
use std::sync::Arc;

use crate::services::fetcher::SourceFetcher;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub host_policy: HostPolicy,
    pub store: Arc<dyn CacheStore>,
    pub storage: Arc<dyn Storage>,
    pub fetcher: Arc<dyn SourceFetcher>,
    pub persist: Arc<PersistQueue>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CacheStore>,
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn SourceFetcher>,
        persist: Arc<PersistQueue>,
    ) -> Self {
        let host_policy = config.host_policy();
        Self {
            config,
            host_policy,
            store,
            storage,
            fetcher,
            persist,
        }
    }
}
