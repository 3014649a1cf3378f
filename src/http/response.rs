//! HTTP response building module
//!
//! Every response carries the `Server` header and, when enabled, the
//! permissive CORS header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Per-request settings shared by all builders
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub enable_cors: bool,
    pub server_name: &'a str,
    /// HEAD requests get headers only
    pub is_head: bool,
}

fn base_builder(ctx: &ResponseContext<'_>, status: StatusCode) -> Builder {
    let builder = Response::builder()
        .status(status)
        .header("Server", ctx.server_name);
    if ctx.enable_cors {
        builder.header("Access-Control-Allow-Origin", "*")
    } else {
        builder
    }
}

/// Serialize `body` as JSON
pub fn build_json_response<T: Serialize>(
    ctx: &ResponseContext<'_>,
    status: StatusCode,
    body: &T,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json_bytes(ctx, status, Bytes::from(json)),
        Err(e) => {
            tracing::error!("Failed to serialize response: {e}");
            build_error_response(ctx, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `{"error": message}` with the given status
pub fn build_error_response(
    ctx: &ResponseContext<'_>,
    status: StatusCode,
    message: &str,
) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    build_json_bytes(ctx, status, Bytes::from(body.to_string()))
}

/// Build 404 Not Found response
pub fn build_404_response(ctx: &ResponseContext<'_>) -> Response<Full<Bytes>> {
    build_error_response(ctx, StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(ctx: &ResponseContext<'_>) -> Response<Full<Bytes>> {
    let mut response =
        build_error_response(ctx, StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(ctx: &ResponseContext<'_>) -> Response<Full<Bytes>> {
    let mut builder = base_builder(ctx, StatusCode::NO_CONTENT).header("Allow", ALLOWED_METHODS);

    if ctx.enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn build_json_bytes(
    ctx: &ResponseContext<'_>,
    status: StatusCode,
    json: Bytes,
) -> Response<Full<Bytes>> {
    let content_length = json.len();
    let body = if ctx.is_head { Bytes::new() } else { json };

    base_builder(ctx, status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}
