//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body-size
//! check, route matching, response decoration and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::webapp::{self, EntryRoute};
use hyper::body::Body;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, IF_NONE_MATCH, REFERER, SERVER,
    USER_AGENT,
};
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();

    let response = match precheck(&req, &state) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: req.uri().path(),
                is_head: *req.method() == Method::HEAD,
                if_none_match: header_string(&req, IF_NONE_MATCH),
            };
            route_request(&ctx, &state).await
        }
    };
    let response = decorate(response, &state);

    if state.config.logging.access_log {
        log_access(&req, &response, remote_addr, started, &state);
    }
    Ok(response)
}

/// Method and body-size checks; `Some` short-circuits routing
fn precheck<B>(req: &Request<B>, state: &AppState) -> Option<HttpResponse> {
    match *req.method() {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return Some(http::build_options_response(state.config.http.enable_cors)),
        ref other => {
            logger::log_warning(&format!("Method not allowed: {other}"));
            return Some(http::build_405_response());
        }
    }
    check_body_size(req, state.config.http.max_body_size)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    // Health check endpoints (highest priority, always fast)
    let health = &state.config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    // Uptime probes hit `HEAD /`; answer without touching the disk
    if ctx.is_head && ctx.path == "/" {
        return http::build_head_ok_response();
    }

    let webapp_config = &state.config.webapp;
    if let Some(route) = EntryRoute::from_path(ctx.path, &webapp_config.mount_path) {
        return webapp::serve_entry(state, route, ctx.is_head).await;
    }

    if state.static_mounted {
        return static_files::serve_mount(
            ctx,
            &state.static_dir,
            &webapp_config.mount_path,
            &webapp_config.index_files,
        )
        .await;
    }

    http::build_404_response()
}

/// Headers added to every response
fn decorate(mut response: HttpResponse, state: &AppState) -> HttpResponse {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        headers
            .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
            .or_insert(HeaderValue::from_static("*"));
    }
    response
}

fn log_access<B>(
    req: &Request<B>,
    response: &HttpResponse,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
