// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub filter: FilterConfig,
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

/// Storage backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Directory served as the root of the tree
    pub root: String,
    /// Resolve symbolic links instead of hiding them
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// Filter rules, evaluated in order (first match wins)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FilterConfig {
    /// Rules such as `- hidden.txt` or `+ *.jpg`
    #[serde(default)]
    pub rules: Vec<String>,
    /// File with one rule per line, applied after `rules`
    #[serde(default)]
    pub rules_file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Output format of the log lines (text or json)
    pub format: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send the request headers
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}
