//! Tracing spans for OCHP calls.

use crate::errors::{Diagnostics, OchpError};
use tracing::{span, Level, Span};

/// Create a span for a single call
pub fn create_call_span(action: &str, call_id: &str) -> Span {
    span!(
        Level::INFO,
        "ochp_call",
        action = %action,
        call_id = %call_id,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        ochp.error_kind = tracing::field::Empty,
        ochp.result_code = tracing::field::Empty,
    )
}

/// Record success on a span
pub fn record_success(span: &Span) {
    span.record("otel.status_code", "OK");
}

/// Record a classified error on a span and log it
pub fn record_error(span: &Span, error: &OchpError) {
    span.record("otel.status_code", "ERROR");
    span.record("ochp.error_kind", error.kind().as_str());

    if let Some(response) = error.http_response() {
        span.record("http.status_code", response.status_code());
    }
    if !error.result_code().is_empty() {
        span.record("ochp.result_code", error.result_code());
    }

    tracing::warn!(
        parent: span,
        kind = %error.kind(),
        body = error.http_response_body().map(super::body_preview).as_deref(),
        "{error}"
    );
}
