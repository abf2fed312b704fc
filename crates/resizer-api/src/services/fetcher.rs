//! Source fetching
//!
//! A fetched source lives in a uniquely named temp file under the work directory until
//! [`FetchedSource::release`] deletes it. Dropping an unreleased source also deletes the file.

use async_trait::async_trait;
use futures::StreamExt;
use resizer_core::{LogEvent, ResizerError, ResizerResult};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use url::Url;

const USER_AGENT: &str = concat!("resizer/", env!("CARGO_PKG_VERSION"));

/// Source bytes on local disk.
#[derive(Debug)]
pub struct FetchedSource {
    path: TempPath,
    size_bytes: u64,
}

impl FetchedSource {
    pub fn new(path: TempPath, size_bytes: u64) -> Self {
        Self { path, size_bytes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub async fn read(&self) -> ResizerResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Delete the temp file.
    pub fn release(self) -> ResizerResult<()> {
        let shown = self.path.display().to_string();
        self.path.close()?;
        tracing::debug!(event = %LogEvent::SourceReleased, path = %shown, "Source released");
        Ok(())
    }
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> ResizerResult<FetchedSource>;
}

/// Fetches sources over HTTP(S) with reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    work_dir: PathBuf,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(work_dir: PathBuf, timeout: Duration, max_bytes: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            work_dir,
            max_bytes,
        })
    }

    /// Wipe leftovers from a previous run and recreate the work directory.
    pub async fn prepare_work_dir(work_dir: &Path) -> io::Result<()> {
        match tokio::fs::remove_dir_all(work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tokio::fs::create_dir_all(work_dir).await
    }

    fn too_large(&self, url: &Url, size: u64) -> ResizerError {
        ResizerError::SourceFetch(format!(
            "{} is larger than the {} byte limit ({} bytes)",
            url, self.max_bytes, size
        ))
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    #[tracing::instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> ResizerResult<FetchedSource> {
        let started = std::time::Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ResizerError::SourceFetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResizerError::SourceFetch(format!(
                "{} answered {}",
                url, status
            )));
        }
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large(url, length));
            }
        }

        let (file, path) = tempfile::Builder::new()
            .prefix("source-")
            .tempfile_in(&self.work_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        // `path` deletes the partial file if any step below fails.
        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk =
                chunk.map_err(|e| ResizerError::SourceFetch(format!("{}: {}", url, e)))?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(self.too_large(url, written));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::info!(
            event = %LogEvent::SourceFetched,
            size_bytes = written,
            duration_ms = started.elapsed().as_millis() as u64,
            "Source fetched"
        );

        Ok(FetchedSource::new(path, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tempfile::TempDir;

    async fn origin() -> String {
        let app = Router::new()
            .route("/small.bin", get(|| async { vec![7u8; 64] }))
            .route("/large.bin", get(|| async { vec![7u8; 4096] }))
            .route("/missing.bin", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fetcher(dir: &TempDir) -> HttpFetcher {
        HttpFetcher::new(dir.path().to_path_buf(), Duration::from_secs(5), 1024).unwrap()
    }

    fn entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_fetch_and_release() {
        let base = origin().await;
        let dir = TempDir::new().unwrap();
        let fetcher = fetcher(&dir);

        let url = Url::parse(&format!("{}/small.bin", base)).unwrap();
        let source = fetcher.fetch(&url).await.unwrap();
        assert_eq!(source.size_bytes(), 64);
        assert!(source.path().starts_with(dir.path()));
        assert_eq!(source.read().await.unwrap(), vec![7u8; 64]);
        assert_eq!(entries(&dir), 1);

        source.release().unwrap();
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_unique_temp_names() {
        let base = origin().await;
        let dir = TempDir::new().unwrap();
        let fetcher = fetcher(&dir);
        let url = Url::parse(&format!("{}/small.bin", base)).unwrap();

        let first = fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();
        assert_ne!(first.path(), second.path());
        drop(first);
        drop(second);
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let base = origin().await;
        let dir = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/missing.bin", base)).unwrap();
        let err = fetcher(&dir).fetch(&url).await.unwrap_err();
        assert!(matches!(err, ResizerError::SourceFetch(_)));
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_oversize_body_is_rejected() {
        let base = origin().await;
        let dir = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/large.bin", base)).unwrap();
        let err = fetcher(&dir).fetch(&url).await.unwrap_err();
        assert!(matches!(err, ResizerError::SourceFetch(_)));
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_prepare_work_dir_wipes_leftovers() {
        let dir = TempDir::new().unwrap();
        let work_dir = dir.path().join("work");
        std::fs::create_dir_all(&work_dir).unwrap();
        std::fs::write(work_dir.join("source-stale"), b"stale").unwrap();

        HttpFetcher::prepare_work_dir(&work_dir).await.unwrap();
        assert!(work_dir.is_dir());
        assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
    }
}
