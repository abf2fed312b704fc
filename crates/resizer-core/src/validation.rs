//! Request validation
//!
//! Turns the raw query string of a resize request into a [`ValidatedRequest`]. Validation is
//! pure: it performs no I/O, and every rejection is a [`ResizerError::InvalidRequest`].

use crate::error::{ResizerError, ResizerResult};
use crate::fingerprint::ValidatedFingerprint;
use crate::models::{Dimension, FitMethod, OutputFormat, ValidatedRequest};
use serde::Deserialize;
use url::Url;

const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Query parameters as received, before any interpretation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    pub url: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub method: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
}

/// Source host allow-list. An empty list allows every host.
#[derive(Debug, Clone, Default)]
pub struct HostPolicy {
    hosts: Vec<String>,
}

impl HostPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Exact, case-insensitive host comparison.
    pub fn allows(&self, host: &str) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        let host = host.to_lowercase();
        self.hosts.iter().any(|allowed| *allowed == host)
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }
}

/// Validate a raw query against the host policy.
pub fn validate(raw: &RawQuery, policy: &HostPolicy) -> ResizerResult<ValidatedRequest> {
    let url = parse_source_url(raw.url.as_deref(), policy)?;
    let width = parse_dimension("width", raw.width.as_deref())?;
    let height = parse_dimension("height", raw.height.as_deref())?;

    let method = match non_empty(raw.method.as_deref()) {
        Some(token) => token.parse::<FitMethod>()?,
        None => FitMethod::default(),
    };
    let format = match non_empty(raw.format.as_deref()) {
        Some(token) => token.parse::<OutputFormat>()?,
        None => OutputFormat::default(),
    };

    let requested_quality = non_empty(raw.quality.as_deref())
        .map(parse_quality)
        .transpose()?;
    let quality = if format.is_lossy() {
        requested_quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    } else {
        0
    };

    Ok(ValidatedRequest {
        fingerprint: ValidatedFingerprint::of_url(&url),
        url,
        width,
        height,
        method,
        format,
        quality,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_source_url(raw: Option<&str>, policy: &HostPolicy) -> ResizerResult<Url> {
    let raw = non_empty(raw)
        .ok_or_else(|| ResizerError::InvalidRequest("url is required".to_string()))?;

    let url = Url::parse(raw)
        .map_err(|e| ResizerError::InvalidRequest(format!("Invalid url '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ResizerError::InvalidRequest(format!(
            "Unsupported url scheme: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ResizerError::InvalidRequest("url must have a host".to_string()))?;

    if !policy.allows(host) {
        return Err(ResizerError::InvalidRequest(format!(
            "Host '{}' is not allowed",
            host
        )));
    }

    Ok(url)
}

fn parse_dimension(name: &str, raw: Option<&str>) -> ResizerResult<Dimension> {
    let Some(raw) = non_empty(raw) else {
        return Ok(Dimension::Unconstrained);
    };
    let value = raw.parse::<u32>().map_err(|_| {
        ResizerError::InvalidRequest(format!("{} must be a positive integer, got '{}'", name, raw))
    })?;
    Dimension::pixels(value)
        .ok_or_else(|| ResizerError::InvalidRequest(format!("{} must be greater than 0", name)))
}

fn parse_quality(raw: &str) -> ResizerResult<u8> {
    match raw.parse::<u8>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q),
        _ => Err(ResizerError::InvalidRequest(format!(
            "quality must be between 1 and 100, got '{}'",
            raw
        ))),
    }
}
