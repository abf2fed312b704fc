//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use resizer_core::{Config, MetadataBackend};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }
    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }
    if config.fetch_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("FETCH_TIMEOUT_SECONDS cannot be 0"));
    }
    if config.max_source_size_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_SOURCE_SIZE_MB cannot be 0"));
    }

    let host_policy = config.host_policy();
    if host_policy.is_unrestricted() {
        if config.is_production() {
            tracing::warn!(
                "ALLOWED_HOSTS is empty in production - any public URL can be resized"
            );
        }
    } else {
        tracing::info!(hosts = %host_policy.hosts().join(","), "Source host allow-list active");
    }

    if config.metadata_backend() == MetadataBackend::Memory && config.is_production() {
        tracing::warn!("In-memory metadata backend in production - cache records are lost on restart");
    }

    if config.request_timeout_seconds() <= config.fetch_timeout_seconds() {
        tracing::warn!(
            request_timeout_seconds = config.request_timeout_seconds(),
            fetch_timeout_seconds = config.fetch_timeout_seconds(),
            "Request timeout does not exceed fetch timeout - slow sources surface as request timeouts"
        );
    }

    Ok(())
}
