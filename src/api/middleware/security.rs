//! Security middleware for HTTP headers and request validation

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::types::ApiError;

/// Maximum request body size (1 MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Reject suspicious paths and add security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    if let Err(err) = validate_request_path(request.uri().path()) {
        return err.into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    // Tokens travel in response bodies
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

/// Reject path traversal and null bytes
///
/// Only a whole `..` segment counts as traversal, so names like `a..b` pass.
fn validate_request_path(path: &str) -> Result<(), ApiError> {
    if path.split('/').any(is_parent_segment) || path.contains("//") {
        return Err(ApiError::bad_request("Invalid path: path traversal detected"));
    }

    if path.contains('\0') || path.contains("%00") {
        return Err(ApiError::bad_request("Invalid request: prohibited characters"));
    }

    Ok(())
}

fn is_parent_segment(segment: &str) -> bool {
    segment.to_ascii_lowercase().replace("%2e", ".") == ".."
}
