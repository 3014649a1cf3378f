//! Logger module
//!
//! Sets up the `tracing` subscriber and provides the server's lifecycle and
//! access log lines:
//! - Server lifecycle logging
//! - Access logging in combined, common or JSON format
//! - Data error logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::error::DataError;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer as _};

/// Subscriber output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to [`LogFormat::Pretty`]
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown logging.format={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// Initialize the global tracing subscriber
///
/// Should be called once at application startup. `RUST_LOG` overrides
/// `logging.level` when set.
pub fn init(config: &Config) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let fmt_layer = match LogFormat::parse(&config.logging.format) {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, data_dir: &Path, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("CSV data server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Data directory: {}", data_dir.display());
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!("  - GET http://{addr}/data_files");
    if config.routes.transcode {
        tracing::info!("  - GET http://{addr}/data_files/{{filename}}");
    }
    tracing::info!(
        "CORS: {}",
        if config.http.enable_cors { "any origin" } else { "disabled" }
    );
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

/// 4xx data errors are the client's problem, everything else is ours
pub fn log_data_error(path: &str, err: &DataError) {
    if err.status().is_client_error() {
        tracing::warn!(status = err.status().as_u16(), "{path}: {err}");
    } else {
        tracing::error!(status = err.status().as_u16(), "{path}: {err}");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    tracing::info!("Shutting down: {reason}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
    }

    #[test]
    fn test_parse_unknown_falls_back_to_pretty() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
    }
}
