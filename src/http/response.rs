//! HTTP response building module
//!
//! Builders for the responses the front door emits. A builder error is logged
//! and replaced by an empty 200 rather than panicking.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_TYPE, ETAG, LOCATION,
};
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;
use super::mime;

pub type HttpResponse = Response<Full<Bytes>>;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, policy: CachePolicy) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, policy.to_header_value())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| fallback("405", &e))
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(ACCESS_CONTROL_ALLOW_METHODS, "*")
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "*")
            .header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| fallback("302", &e))
}

/// Build health probe response
pub fn build_health_response(status: &'static str) -> HttpResponse {
    plain_text(StatusCode::OK, status)
}

/// 200 with an HTML content type and no body, for `HEAD /` probes
pub fn build_head_ok_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::HTML)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("HEAD", &e))
}

/// Build the entry document response
///
/// `policy` of `None` leaves `Cache-Control` unset.
pub fn build_html_response(
    content: Bytes,
    policy: Option<CachePolicy>,
    is_head: bool,
) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::HTML)
        .header(CONTENT_LENGTH, content_length);
    if let Some(policy) = policy {
        builder = builder.header(CACHE_CONTROL, policy.to_header_value());
    }

    builder
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build a static file response with `ETag` and cache control
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    policy: CachePolicy,
    is_head: bool,
) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "none")
        .header(ETAG, etag)
        .header(CACHE_CONTROL, policy.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("200", &e))
}

fn plain_text(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

fn fallback(status: &str, error: &hyper::http::Error) -> HttpResponse {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    Response::new(Full::new(Bytes::new()))
}
