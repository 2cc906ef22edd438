//! Logger module
//!
//! Provides logging utilities for the gateway including:
//! - Subscriber setup (text or JSON lines)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::{Config, LoggingConfig};
use crate::filter::Filter;

/// Target of the access log lines, usable in `RUST_LOG` directives
pub const ACCESS_TARGET: &str = "access";

/// Install the global tracing subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes precedence over
/// `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_thread_ids(false))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_thread_ids(false))
            .try_init()
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, root: &Path, filter: &Filter) {
    tracing::info!("Gateway started, listening on http://{addr}");
    tracing::info!(
        root = %root.display(),
        follow_symlinks = config.backend.follow_symlinks,
        "Serving tree"
    );
    if filter.is_empty() {
        tracing::info!("No filter rules, everything is visible");
    } else {
        tracing::info!("Filter rules: {}", filter.len());
        for rule in filter.rules() {
            tracing::debug!("  {}", rule.source());
        }
    }
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Connection limit: {max}");
    }
}

pub fn log_server_stop() {
    tracing::info!("Gateway stopped accepting connections");
}

pub fn log_shutdown_complete(graceful: bool) {
    if graceful {
        tracing::info!("Shutdown complete");
    } else {
        tracing::warn!("Accept loop ended without a shutdown request");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, limit: u64) {
    tracing::warn!("[Connection] Rejected {peer_addr}: {limit} connections already open");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
