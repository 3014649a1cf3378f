//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching and access logging.

use crate::config::AppState;
use crate::handler::data_files;
use crate::http::{self, ResponseContext};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const LISTING_PATH: &str = "/data_files";

/// Known routes
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Listing,
    /// Percent-encoded file name
    File(&'a str),
    Unknown,
}

fn match_route(path: &str) -> Route<'_> {
    match path.strip_prefix(LISTING_PATH) {
        Some("" | "/") => Route::Listing,
        Some(rest) => rest
            .strip_prefix('/')
            .map_or(Route::Unknown, Route::File),
        None => Route::Unknown,
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    let ctx = ResponseContext {
        enable_cors: state.config.http.enable_cors,
        server_name: &state.config.http.server_name,
        is_head: *method == Method::HEAD,
    };

    let response = match *method {
        Method::GET | Method::HEAD => route_request(&ctx, &state, path).await,
        Method::OPTIONS => http::build_options_response(&ctx),
        _ => {
            tracing::warn!("Method not allowed: {method}");
            http::build_405_response(&ctx)
        }
    };

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::new(remote_addr.ip().to_string(), method.to_string(), path.to_string());
        entry.http_version = format!("{:?}", req.version()).trim_start_matches("HTTP/").to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request(
    ctx: &ResponseContext<'_>,
    state: &AppState,
    path: &str,
) -> Response<Full<Bytes>> {
    match match_route(path) {
        Route::Listing => data_files::serve_listing(ctx, state).await,
        Route::File(name) if state.config.routes.transcode => {
            data_files::serve_file(ctx, state, name).await
        }
        Route::File(_) | Route::Unknown => http::build_404_response(ctx),
    }
}
