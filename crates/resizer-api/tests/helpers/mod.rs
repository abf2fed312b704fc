//! Test helpers: build AppState and router for integration tests.
//!
//! Uses the in-memory metadata store, local storage in a temp dir and a stub fetcher, so no
//! network or Docker is needed. Run with `cargo test -p resizer-api`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use resizer_api::services::fetcher::{FetchedSource, SourceFetcher};
use resizer_api::setup::routes;
use resizer_api::state::AppState;
use resizer_core::config::ResizerConfig;
use resizer_core::{Config, MetadataBackend, ResizerError, ResizerResult, StorageBackend};
use resizer_db::MemoryCacheStore;
use resizer_storage::LocalStorage;
use resizer_worker::{PersistQueue, PersistQueueConfig, StoreAndIndex};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

pub const ALLOWED_HOST: &str = "images.test";
pub const PUBLIC_BASE_URL: &str = "http://cdn.test/objects";

pub fn source_url(name: &str) -> String {
    format!("https://{}/{}", ALLOWED_HOST, name)
}

/// Serves fixture bytes from memory, writing each fetch to a temp file like the real fetcher.
pub struct StubFetcher {
    sources: HashMap<String, Vec<u8>>,
    work_dir: PathBuf,
    fetches: AtomicUsize,
}

impl StubFetcher {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> ResizerResult<FetchedSource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .sources
            .get(url.as_str())
            .ok_or_else(|| ResizerError::SourceFetch(format!("{} answered 404 Not Found", url)))?;

        let mut file = tempfile::Builder::new()
            .prefix("source-")
            .tempfile_in(&self.work_dir)?;
        file.write_all(bytes)?;
        Ok(FetchedSource::new(file.into_temp_path(), bytes.len() as u64))
    }
}

/// Never answers. Counts the fetches that are waiting on it.
#[derive(Default)]
pub struct StalledFetcher {
    in_flight: AtomicUsize,
}

impl StalledFetcher {
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for StalledFetcher {
    async fn fetch(&self, _url: &Url) -> ResizerResult<FetchedSource> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Test application: server plus handles on everything behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryCacheStore>,
    pub storage: Arc<LocalStorage>,
    pub fetcher: Arc<StubFetcher>,
    pub work_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Wait for background persistence to produce `count` records.
    pub async fn wait_for_records(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while self.store.len().await < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {} cache records",
                count
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Files left behind in the fetch work dir.
    pub fn leftover_sources(&self) -> usize {
        std::fs::read_dir(&self.work_dir).unwrap().count()
    }
}

fn test_config(work_dir: &Path, objects_dir: &Path) -> ResizerConfig {
    ResizerConfig {
        allowed_hosts: vec![ALLOWED_HOST.to_string()],
        fetch_work_dir: work_dir.to_path_buf(),
        metadata_backend: MetadataBackend::Memory,
        storage_backend: StorageBackend::Local,
        local_storage_path: Some(objects_dir.display().to_string()),
        local_storage_base_url: Some(PUBLIC_BASE_URL.to_string()),
        ..Default::default()
    }
}

async fn build_state(
    config: &Config,
    objects_dir: PathBuf,
    fetcher: Arc<dyn SourceFetcher>,
) -> (Arc<AppState>, Arc<MemoryCacheStore>, Arc<LocalStorage>) {
    let store = Arc::new(MemoryCacheStore::new());
    let storage = Arc::new(
        LocalStorage::new(objects_dir, PUBLIC_BASE_URL.to_string())
            .await
            .unwrap(),
    );

    let persist = PersistQueue::start(
        PersistQueueConfig {
            capacity: 16,
            max_workers: 2,
            shutdown_grace: Duration::from_secs(5),
        },
        Arc::new(StoreAndIndex::new(
            storage.clone(),
            store.clone(),
            config.cache_max_age_seconds(),
        )),
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        store.clone(),
        storage.clone(),
        fetcher,
        Arc::new(persist),
    ));
    (state, store, storage)
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().join("work");
    std::fs::create_dir_all(&work_dir).unwrap();
    let objects_dir = temp_dir.path().join("objects");

    let config = Config::new(test_config(&work_dir, &objects_dir));
    let fetcher = Arc::new(StubFetcher {
        sources: HashMap::from([
            (source_url("glyph.png"), fixtures::glyph_png()),
            (source_url("glyph.jpg"), fixtures::glyph_jpeg()),
            (source_url("noise.png"), fixtures::noise()),
        ]),
        work_dir: work_dir.clone(),
        fetches: AtomicUsize::new(0),
    });

    let (state, store, storage) = build_state(&config, objects_dir, fetcher.clone()).await;
    let app = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        store,
        storage,
        fetcher,
        work_dir,
        _temp_dir: temp_dir,
    }
}

/// The real router on a loopback socket, in front of a [`StalledFetcher`].
pub struct StalledServer {
    pub base_url: String,
    pub fetcher: Arc<StalledFetcher>,
    pub _temp_dir: TempDir,
}

pub async fn spawn_stalled_server(
    max_http_connections: usize,
    request_timeout_seconds: u64,
) -> StalledServer {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = temp_dir.path().join("work");
    std::fs::create_dir_all(&work_dir).unwrap();
    let objects_dir = temp_dir.path().join("objects");

    let mut inner = test_config(&work_dir, &objects_dir);
    inner.base.max_http_connections = max_http_connections;
    inner.base.request_timeout_seconds = request_timeout_seconds;
    let config = Config::new(inner);

    let fetcher = Arc::new(StalledFetcher::default());
    let (state, _, _) = build_state(&config, objects_dir, fetcher.clone()).await;
    let app = routes::setup_routes(&config, state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StalledServer {
        base_url: format!("http://{}", addr),
        fetcher,
        _temp_dir: temp_dir,
    }
}
