//! Path resolution module
//!
//! Maps a raw request path onto an [`Entry`] of the backend. Filtered, malformed and missing
//! paths all end up as [`GatewayError::NotFound`].

use percent_encoding::percent_decode_str;

use crate::backend::{Backend, Entry};
use crate::error::GatewayError;
use crate::filter::Filter;

/// Turns a raw URL path into a backend path
///
/// Every segment is percent-decoded on its own, so `%2F` can never introduce a separator.
/// Empty and `.` segments are dropped; `..`, invalid UTF-8 and NUL bytes fail closed.
pub fn decode_path(raw: &str) -> Result<String, GatewayError> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        let decoded = percent_decode_str(segment)
            .decode_utf8()
            .map_err(|_| GatewayError::NotFound)?;
        match decoded.as_ref() {
            "" | "." => {}
            ".." => return Err(GatewayError::NotFound),
            name if name.contains(['/', '\0']) => return Err(GatewayError::NotFound),
            _ => segments.push(decoded.into_owned()),
        }
    }
    Ok(segments.join("/"))
}

/// A trailing slash asks for a directory listing
pub fn wants_directory(raw: &str) -> bool {
    raw.ends_with('/')
}

/// Resolves a raw request path to a visible entry of the requested kind
///
/// The filter is consulted before the backend, so hidden paths never cause a lookup.
pub async fn resolve(
    backend: &dyn Backend,
    filter: &Filter,
    raw_path: &str,
) -> Result<Entry, GatewayError> {
    let want_dir = wants_directory(raw_path);
    let path = decode_path(raw_path)?;

    if !filter.is_reachable(&path, want_dir) {
        tracing::debug!(path = %path, "hidden by filter");
        return Err(GatewayError::NotFound);
    }

    let entry = backend.stat(&path).await?.ok_or(GatewayError::NotFound)?;
    if entry.is_dir() != want_dir {
        return Err(GatewayError::NotFound);
    }
    Ok(entry)
}
