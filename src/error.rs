//! Error types
//!
//! Every request failure funnels into [`GatewayError`], which the router maps onto a status
//! code. Hidden and missing paths share [`GatewayError::NotFound`] so clients cannot tell them
//! apart.

use hyper::{Method, StatusCode};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by a storage backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested entry does not exist
    #[error("entry not found")]
    NotFound,
    /// A directory operation was requested on something that is not a directory
    #[error("not a directory")]
    NotADirectory,
    /// The storage could not be read
    #[error("{operation} failed for {path:?}: {source}")]
    Io {
        /// Operation that failed
        operation: &'static str,
        /// Backend path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

impl BackendError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Terminal outcome of a request that did not produce a regular response
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing, filtered or malformed path
    #[error("not found")]
    NotFound,
    /// Anything other than `GET` and `HEAD`
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    /// `Range` header that cannot be served for a file of `size` bytes
    #[error("range not satisfiable for a {size} byte file")]
    RangeUnsatisfiable { size: u64 },
    /// Storage failure, never retried
    #[error("backend failure: {0}")]
    Backend(BackendError),
}

impl GatewayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::RangeUnsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound | BackendError::NotADirectory => Self::NotFound,
            err @ BackendError::Io { .. } => Self::Backend(err),
        }
    }
}

/// Errors raised while compiling filter rules
#[derive(Debug, Error)]
pub enum FilterError {
    /// Line that is neither a `+`/`-` rule nor `!`
    #[error("malformed filter rule {0:?}: expected \"+ pattern\", \"- pattern\" or \"!\"")]
    InvalidRule(String),
    /// Pattern rejected by the glob compiler
    #[error("invalid filter pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// Rules file could not be read
    #[error("failed reading filter rules from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_not_found_hides_as_not_found() {
        assert!(matches!(
            GatewayError::from(BackendError::NotFound),
            GatewayError::NotFound
        ));
        assert!(matches!(
            GatewayError::from(BackendError::NotADirectory),
            GatewayError::NotFound
        ));
    }

    #[test]
    fn test_backend_io_is_server_error() {
        let err = GatewayError::from(BackendError::io(
            "open",
            "/srv/a.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::MethodNotAllowed(Method::POST).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GatewayError::RangeUnsatisfiable { size: 10 }.status(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
    }
}
