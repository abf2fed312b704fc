//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpResizerError>`. The body is JSON by default; when the
//! client's `Accept` header prefers `text/html` (a browser following an `<img>` link by hand)
//! a small HTML page is rendered instead. Call [`HttpResizerError::negotiate`] with the request
//! headers to pick the representation.

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use resizer_core::{ErrorMetadata, LogLevel, ResizerError};
use serde::Serialize;

const APPLICATION_NAME: &str = "Resizer";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether the same request may succeed later
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper for ResizerError implementing IntoResponse (orphan rule).
#[derive(Debug)]
pub struct HttpResizerError {
    pub error: ResizerError,
    pub prefers_html: bool,
}

impl HttpResizerError {
    /// Render as HTML when the request's `Accept` header prefers it.
    pub fn negotiate(mut self, headers: &HeaderMap) -> Self {
        self.prefers_html = prefers_html(headers);
        self
    }
}

impl From<ResizerError> for HttpResizerError {
    fn from(error: ResizerError) -> Self {
        HttpResizerError {
            error,
            prefers_html: false,
        }
    }
}

impl From<anyhow::Error> for HttpResizerError {
    fn from(err: anyhow::Error) -> Self {
        ResizerError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
        .into()
    }
}

/// Unparseable query strings are the client's fault.
impl From<QueryRejection> for HttpResizerError {
    fn from(rejection: QueryRejection) -> Self {
        ResizerError::InvalidRequest(format!("Invalid query string: {}", rejection.body_text()))
            .into()
    }
}

/// Quality value of a media range in an `Accept` header, e.g. `text/html;q=0.8`.
fn media_quality(headers: &HeaderMap, media_type: &str) -> Option<f32> {
    let accept = headers.get(header::ACCEPT)?.to_str().ok()?;
    accept.split(',').find_map(|range| {
        let mut parts = range.split(';');
        let name = parts.next()?.trim();
        if !name.eq_ignore_ascii_case(media_type) {
            return None;
        }
        let quality = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        Some(quality)
    })
}

/// HTML wins only when it is named explicitly and ranked at least as high as JSON.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    match media_quality(headers, "text/html") {
        Some(html) if html > 0.0 => html >= media_quality(headers, "application/json").unwrap_or(0.0),
        _ => false,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn html_page(status: StatusCode, message: &str) -> String {
    let text = status.canonical_reason().unwrap_or("Error");
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{code} {text}</title></head>\n<body>\n\
         <h1>{text}</h1>\n<p>{message}</p>\n<hr>\n<address>{APPLICATION_NAME}</address>\n\
         </body>\n</html>\n",
        code = status.as_u16(),
        message = escape_html(message),
    )
}

fn log_error(error: &ResizerError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpResizerError {
    fn into_response(self) -> Response {
        let error = &self.error;
        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(error);

        // Details never leave the process in production or for sensitive errors.
        let hide_details = is_production_env() || error.is_sensitive();

        if self.prefers_html {
            let message = if hide_details {
                error.client_message()
            } else {
                error.to_string()
            };
            let mut response = (status, html_page(status, &message)).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            return response;
        }

        let body = ErrorResponse {
            error: error.client_message(),
            details: (!hide_details).then(|| error.detailed_message()),
            error_type: (!hide_details).then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}
