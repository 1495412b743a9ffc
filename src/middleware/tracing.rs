// ABOUTME: Request tracing spans for correlation and structured logging
// ABOUTME: Generates or propagates request IDs and opens one span per HTTP request

use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id from the incoming header, or a freshly generated one
#[must_use]
pub fn request_id_for<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(
            || format!("req_{}", Uuid::new_v4().simple()),
            ToOwned::to_owned,
        )
}

/// Create a tracing span for an HTTP request
///
/// Used as the `make_span_with` hook of the `tower-http` trace layer.
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id_for(request),
        user_id = tracing::field::Empty,
    )
}
