use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use resizer_core::{RawQuery, ResizerError};
use std::sync::Arc;

use crate::error::HttpResizerError;
use crate::services::pipeline::{self, ResizeOutcome};
use crate::state::AppState;

#[tracing::instrument(skip(state, headers, query), fields(url))]
pub async fn resize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<RawQuery>, QueryRejection>,
) -> Result<Response, HttpResizerError> {
    let outcome = match query {
        Ok(Query(raw)) => {
            if let Some(url) = raw.url.as_deref() {
                tracing::Span::current().record("url", url);
            }
            pipeline::resize(&state, &raw).await.map_err(HttpResizerError::from)
        }
        Err(rejection) => Err(HttpResizerError::from(rejection)),
    }
    .map_err(|e| e.negotiate(&headers))?;

    match outcome {
        ResizeOutcome::Redirect { location, tier } => {
            tracing::debug!(location = %location, tier = ?tier, "Redirecting to stored object");
            Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .map_err(|e| response_error(e, &headers))
        }
        ResizeOutcome::Rendered { image, etag, job } => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, image.content_type())
                .header(header::CONTENT_LENGTH, image.bytes.len())
                .header(header::ETAG, format!("\"{}\"", etag))
                .body(Body::from(image.bytes))
                .map_err(|e| response_error(e, &headers))?;

            // Stored in the background once the response exists.
            state.persist.submit(job);
            Ok(response)
        }
    }
}

fn response_error(err: axum::http::Error, headers: &HeaderMap) -> HttpResizerError {
    HttpResizerError::from(ResizerError::Internal(format!(
        "Failed to build response: {}",
        err
    )))
    .negotiate(headers)
}
