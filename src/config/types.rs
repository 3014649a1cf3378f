// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    pub routes: RoutesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Data directory configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// Directory holding the served CSV files.
    /// Falls back to `<parent-of-exe-dir>/static-site/data` when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Listing output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ListingConfig {
    /// Prepended to every listed file name (e.g. "data/")
    #[serde(default)]
    pub prefix: String,
}

/// Route toggles
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    /// Serve `/data_files/{filename}` as JSON rows
    pub transcode: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Output format of the tracing subscriber (pretty or json)
    pub format: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: String,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound in seconds for serving one connection
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}
