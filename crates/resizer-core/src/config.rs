//! Configuration module
//!
//! Configuration is read from environment variables (optionally seeded from a `.env` file)
//! and validated once at startup.

use std::env;
use std::path::PathBuf;

use crate::storage_types::{MetadataBackend, StorageBackend};
use crate::validation::HostPolicy;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const OBJECT_PREFIX: &str = "resized/";
/// Six months, matching the lifetime resized objects are served with.
const CACHE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30 * 6;
const FETCH_TIMEOUT_SECS: u64 = 30;
const MAX_SOURCE_SIZE_MB: u64 = 50;
const PERSIST_QUEUE_CAPACITY: usize = 256;
const PERSIST_WORKERS: usize = 4;
const PERSIST_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Console output format for tracing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Listener and process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    /// 0 disables the limit.
    pub max_http_connections: usize,
    pub request_timeout_seconds: u64,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            max_http_connections: 0,
            request_timeout_seconds: REQUEST_TIMEOUT_SECS,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            environment: "development".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

/// Resizer service configuration
#[derive(Clone, Debug)]
pub struct ResizerConfig {
    pub base: BaseConfig,
    // Source policy
    pub allowed_hosts: Vec<String>,
    pub fetch_timeout_seconds: u64,
    pub max_source_size_bytes: u64,
    pub fetch_work_dir: PathBuf,
    // Metadata index
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    // Blob storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub object_prefix: String,
    pub cache_max_age_seconds: u64,
    // Background persistence
    pub persist_queue_capacity: usize,
    pub persist_workers: usize,
    pub persist_shutdown_grace_seconds: u64,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            allowed_hosts: Vec::new(),
            fetch_timeout_seconds: FETCH_TIMEOUT_SECS,
            max_source_size_bytes: MAX_SOURCE_SIZE_MB * 1024 * 1024,
            fetch_work_dir: env::temp_dir().join("resizer"),
            metadata_backend: MetadataBackend::Postgres,
            database_url: None,
            storage_backend: StorageBackend::S3,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            object_prefix: OBJECT_PREFIX.to_string(),
            cache_max_age_seconds: CACHE_MAX_AGE_SECS,
            persist_queue_capacity: PERSIST_QUEUE_CAPACITY,
            persist_workers: PERSIST_WORKERS,
            persist_shutdown_grace_seconds: PERSIST_SHUTDOWN_GRACE_SECS,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ResizerConfig>);

impl Config {
    pub fn new(inner: ResizerConfig) -> Self {
        Config(Box::new(inner))
    }

    fn inner(&self) -> &ResizerConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ResizerConfig::from_env()?;
        Ok(Config::new(config))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn max_http_connections(&self) -> usize {
        self.inner().base.max_http_connections
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.inner().base.request_timeout_seconds
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().base.log_format
    }

    pub fn host_policy(&self) -> HostPolicy {
        HostPolicy::new(&self.inner().allowed_hosts)
    }

    pub fn fetch_timeout_seconds(&self) -> u64 {
        self.inner().fetch_timeout_seconds
    }

    pub fn max_source_size_bytes(&self) -> u64 {
        self.inner().max_source_size_bytes
    }

    pub fn fetch_work_dir(&self) -> &PathBuf {
        &self.inner().fetch_work_dir
    }

    pub fn metadata_backend(&self) -> MetadataBackend {
        self.inner().metadata_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn object_prefix(&self) -> &str {
        &self.inner().object_prefix
    }

    pub fn cache_max_age_seconds(&self) -> u64 {
        self.inner().cache_max_age_seconds
    }

    pub fn persist_queue_capacity(&self) -> usize {
        self.inner().persist_queue_capacity
    }

    pub fn persist_workers(&self) -> usize {
        self.inner().persist_workers
    }

    pub fn persist_shutdown_grace_seconds(&self) -> u64 {
        self.inner().persist_shutdown_grace_seconds
    }
}

/// Parse `key` when set. Unset or blank falls back to `default`; garbage is an error.
fn env_or<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a valid number, got {:?}: {}", key, value, e)),
        None => Ok(default),
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ResizerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            max_http_connections: env_or("MAX_HTTP_CONNECTIONS", 0)?,
            request_timeout_seconds: env_or("REQUEST_TIMEOUT_SECONDS", REQUEST_TIMEOUT_SECS)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            environment,
            log_format,
        };

        let allowed_hosts = env::var("ALLOWED_HOSTS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let metadata_backend = match env_opt("METADATA_BACKEND") {
            Some(value) => value.parse()?,
            None => MetadataBackend::Postgres,
        };
        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let fetch_work_dir = env_opt("FETCH_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("resizer"));

        Ok(ResizerConfig {
            base,
            allowed_hosts,
            fetch_timeout_seconds: env_or("FETCH_TIMEOUT_SECONDS", FETCH_TIMEOUT_SECS)?,
            max_source_size_bytes: env_or("MAX_SOURCE_SIZE_MB", MAX_SOURCE_SIZE_MB)? * 1024 * 1024,
            fetch_work_dir,
            metadata_backend,
            database_url: env_opt("DATABASE_URL"),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            object_prefix: env::var("OBJECT_PREFIX").unwrap_or_else(|_| OBJECT_PREFIX.to_string()),
            cache_max_age_seconds: env_or("CACHE_MAX_AGE_SECONDS", CACHE_MAX_AGE_SECS)?,
            persist_queue_capacity: env_or("PERSIST_QUEUE_CAPACITY", PERSIST_QUEUE_CAPACITY)?,
            persist_workers: env_or("PERSIST_WORKERS", PERSIST_WORKERS)?,
            persist_shutdown_grace_seconds: env_or(
                "PERSIST_SHUTDOWN_GRACE_SECONDS",
                PERSIST_SHUTDOWN_GRACE_SECS,
            )?,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.metadata_backend == MetadataBackend::Postgres {
            let url = self.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL must be set when using the postgres metadata backend")
            })?;
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.persist_queue_capacity == 0 || self.persist_workers == 0 {
            return Err(anyhow::anyhow!(
                "PERSIST_QUEUE_CAPACITY and PERSIST_WORKERS must be greater than 0"
            ));
        }

        if self.object_prefix.starts_with('/') || self.object_prefix.contains("..") {
            return Err(anyhow::anyhow!(
                "OBJECT_PREFIX must be relative and must not contain '..'"
            ));
        }

        Ok(())
    }
}
