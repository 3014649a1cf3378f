//! Data route handlers
//!
//! Thin adapters between the data module and JSON responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::data;
use crate::error::DataError;
use crate::http::{self, ResponseContext};
use crate::logger;

/// `GET /data_files`
pub async fn serve_listing(ctx: &ResponseContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match data::list_data_files(&state.data_dir, &state.config.listing.prefix).await {
        Ok(listing) => http::build_json_response(ctx, StatusCode::OK, &listing),
        Err(e) => data_error_response(ctx, "/data_files", &e),
    }
}

/// `GET /data_files/{filename}`, `raw_name` still percent-encoded
pub async fn serve_file(
    ctx: &ResponseContext<'_>,
    state: &AppState,
    raw_name: &str,
) -> Response<Full<Bytes>> {
    let request_path = format!("/data_files/{raw_name}");

    let Ok(filename) = urlencoding::decode(raw_name) else {
        let err = DataError::InvalidFilename(raw_name.to_string());
        return data_error_response(ctx, &request_path, &err);
    };

    match data::transcode(&state.data_dir, &filename).await {
        Ok(envelope) => http::build_json_response(ctx, StatusCode::OK, &envelope),
        Err(e) => data_error_response(ctx, &request_path, &e),
    }
}

/// Client errors echo the reason; server errors stay generic
fn data_error_response(
    ctx: &ResponseContext<'_>,
    path: &str,
    err: &DataError,
) -> Response<Full<Bytes>> {
    logger::log_data_error(path, err);
    let status = err.status();
    if status.is_server_error() {
        http::build_error_response(ctx, status, "Internal Server Error")
    } else {
        http::build_error_response(ctx, status, &err.to_string())
    }
}
