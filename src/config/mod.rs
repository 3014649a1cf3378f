// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::AppState;
pub use types::Config;

/// Directory layout used when `data.dir` is not configured
const DEFAULT_DATA_SUBDIR: [&str; 2] = ["static-site", "data"];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 2589)?
            .set_default("listing.prefix", "")?
            .set_default("routes.transcode", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "csv-data-server")?
            .set_default("http.enable_cors", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Resolve the data directory once at startup.
    ///
    /// An explicit `data.dir` wins; otherwise the directory is
    /// `<parent-of-exe-dir>/static-site/data`.
    pub fn resolve_data_dir(&self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.data.dir {
            return Ok(PathBuf::from(dir));
        }
        let exe = std::env::current_exe()?;
        Ok(default_data_dir(&exe))
    }
}

/// `<parent-of-exe-dir>/static-site/data` for the given executable path
fn default_data_dir(exe: &std::path::Path) -> PathBuf {
    let exe_dir = exe.parent().unwrap_or_else(|| std::path::Path::new("."));
    let base = exe_dir.parent().unwrap_or(exe_dir);
    DEFAULT_DATA_SUBDIR
        .iter()
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 2589);
        assert!(cfg.routes.transcode);
        assert!(cfg.http.enable_cors);
        assert!(cfg.listing.prefix.is_empty());
        assert!(cfg.data.dir.is_none());
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 2589);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_invalid_socket_addr() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        cfg.data.dir = Some("/srv/csv".to_string());
        assert_eq!(cfg.resolve_data_dir().unwrap(), PathBuf::from("/srv/csv"));
    }

    #[test]
    fn test_default_data_dir_is_sibling_of_exe_dir() {
        let dir = default_data_dir(Path::new("/opt/app/server/csv_data_server"));
        assert_eq!(dir, PathBuf::from("/opt/app/static-site/data"));
    }
}
