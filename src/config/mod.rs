// Configuration module entry point
// Loads the layered configuration and holds the immutable server context

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::FilterError;
use crate::filter::Filter;

// Re-export public types
pub use state::AppState;
pub use types::{
    BackendConfig, Config, FilterConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Values given on the command line, they win over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub addr: Option<SocketAddr>,
    pub root: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "fsgate.toml" when no path specified
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FSGATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("backend.root", ".")?
            .set_default("backend.follow_symlinks", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.server_name", concat!("fsgate/", env!("CARGO_PKG_VERSION")))?;

        if let Some(addr) = overrides.addr {
            builder = builder
                .set_override("server.host", addr.ip().to_string())?
                .set_override("server.port", i64::from(addr.port()))?;
        }
        if let Some(root) = &overrides.root {
            builder = builder.set_override("backend.root", root.as_str())?;
        }
        if let Some(level) = &overrides.log_level {
            builder = builder.set_override("logging.level", level.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = &self.server.host;
        // IPv6 literals need brackets before the port is appended
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        addr.parse().map_err(|e| format!("Invalid address '{addr}': {e}"))
    }

    /// Compiles the configured rules followed by `extra_rules` and `extra_files`
    pub fn build_filter(
        &self,
        extra_rules: &[String],
        extra_files: &[PathBuf],
    ) -> Result<Filter, FilterError> {
        let mut filter = Filter::from_rules(&self.filter.rules)?;
        if let Some(path) = &self.filter.rules_file {
            filter.add_rules_file(path.as_ref())?;
        }
        for rule in extra_rules {
            filter.add_rule(rule)?;
        }
        for path in extra_files {
            filter.add_rules_file(path)?;
        }
        Ok(filter)
    }
}
