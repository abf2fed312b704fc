//! Two-tier cache protocol for one resize request.
//!
//! ```text
//! validate -> tier 1 lookup -> fetch -> decode -> normalize -> tier 2 lookup -> render
//! ```
//!
//! Either lookup may end the request with a redirect to the stored object. A fresh render
//! returns the encoded bytes together with the persist job the caller submits once the
//! response has been built.

use resizer_core::{
    validate, LogEvent, NewCacheRecord, NormalizedKey, RawQuery, ResizerError, ResizerResult,
    ValidatedRequest,
};
use resizer_processing::{
    normalize, DecodedImage, ImageProcessor, ImageTransformer, RenderedImage,
};
use resizer_worker::PersistJob;
use std::time::Instant;

use crate::services::fetcher::FetchedSource;
use crate::state::AppState;

/// Which lookup answered a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Validated,
    Normalized,
}

#[derive(Debug)]
pub enum ResizeOutcome {
    /// Already stored; send the client to the object.
    Redirect { location: String, tier: CacheTier },
    /// Freshly rendered; respond with `image`, then submit `job`.
    Rendered {
        image: RenderedImage,
        etag: String,
        job: PersistJob,
    },
}

pub async fn resize(state: &AppState, raw: &RawQuery) -> ResizerResult<ResizeOutcome> {
    let started = Instant::now();

    let request = validate(raw, &state.host_policy)?;
    tracing::debug!(
        event = %LogEvent::RequestValidated,
        url = %request.url,
        validated_hash = %request.fingerprint,
        width = %request.width,
        height = %request.height,
        method = %request.method,
        format = %request.format,
        quality = request.quality,
        "Request validated"
    );

    if let Some(record) = state.store.find_by_validated(&request.validated_key()).await? {
        tracing::info!(
            event = %LogEvent::ValidatedCacheHit,
            validated_hash = %request.fingerprint,
            object_name = %record.object_name,
            duration_ms = started.elapsed().as_millis() as u64,
            "Validated cache hit"
        );
        return Ok(ResizeOutcome::Redirect {
            location: state.storage.public_url(&record.object_name),
            tier: CacheTier::Validated,
        });
    }
    tracing::debug!(
        event = %LogEvent::ValidatedCacheMiss,
        validated_hash = %request.fingerprint,
        "Validated cache miss"
    );

    let source = state.fetcher.fetch(&request.url).await?;
    let decoded = decode_and_release(source).await?;
    let natural = decoded.natural_size();
    tracing::debug!(
        event = %LogEvent::SourcePreprocessed,
        validated_hash = %request.fingerprint,
        natural_width = natural.0,
        natural_height = natural.1,
        orientation = decoded.orientation(),
        source_format = ?decoded.source_format(),
        "Source decoded"
    );

    let normalized = normalize(&request, natural)?;
    let normalized_key = normalized.key(&request);
    if let Some(record) = state.store.find_by_normalized(&normalized_key).await? {
        tracing::info!(
            event = %LogEvent::NormalizedCacheHit,
            validated_hash = %request.fingerprint,
            normalized_hash = %normalized.fingerprint,
            object_name = %record.object_name,
            duration_ms = started.elapsed().as_millis() as u64,
            "Normalized cache hit"
        );
        return Ok(ResizeOutcome::Redirect {
            location: state.storage.public_url(&record.object_name),
            tier: CacheTier::Normalized,
        });
    }
    tracing::debug!(
        event = %LogEvent::NormalizedCacheMiss,
        normalized_hash = %normalized.fingerprint,
        dest_width = normalized.dest_width,
        dest_height = normalized.dest_height,
        "Normalized cache miss"
    );

    let plan = normalized.plan;
    let (format, quality) = (request.format, request.quality);
    let image = tokio::task::spawn_blocking(move || {
        ImageTransformer::render(&decoded, &plan, format, quality)
    })
    .await
    .map_err(|e| ResizerError::Internal(format!("Render task failed: {}", e)))??;

    let etag = image.etag();
    let object_name = request.object_name(state.config.object_prefix());
    tracing::info!(
        event = %LogEvent::Resized,
        url = %request.url,
        validated_hash = %request.fingerprint,
        normalized_hash = %normalized.fingerprint,
        object_name = %object_name,
        canvas_width = image.width,
        canvas_height = image.height,
        size_bytes = image.bytes.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Image resized"
    );

    let job = PersistJob {
        bytes: image.bytes.clone(),
        record: new_record(&request, normalized_key, &image, &etag, object_name),
    };
    Ok(ResizeOutcome::Rendered { image, etag, job })
}

/// Decode the fetched file. The file is released whether or not decoding succeeds.
async fn decode_and_release(source: FetchedSource) -> ResizerResult<DecodedImage> {
    let decoded = async {
        let data = source.read().await?;
        tokio::task::spawn_blocking(move || ImageProcessor::preprocess(&data))
            .await
            .map_err(|e| ResizerError::Internal(format!("Decode task failed: {}", e)))?
    }
    .await;

    if let Err(e) = source.release() {
        tracing::warn!(error = %e, "Failed to release fetched source");
    }
    decoded
}

fn new_record(
    request: &ValidatedRequest,
    normalized: NormalizedKey,
    image: &RenderedImage,
    etag: &str,
    object_name: String,
) -> NewCacheRecord {
    NewCacheRecord {
        url: request.url.to_string(),
        validated: request.validated_key(),
        normalized,
        etag: etag.to_string(),
        object_name,
        content_type: image.content_type().to_string(),
        canvas_width: image.width,
        canvas_height: image.height,
    }
}
