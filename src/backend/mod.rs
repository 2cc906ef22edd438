//! Storage backend module
//!
//! The gateway never touches storage directly. Everything goes through the [`Backend`] trait,
//! which hands out [`Entry`] values for paths and lazy byte streams for file ranges.
//!
//! Paths are relative to the served root, `/`-separated, without leading or trailing slash.
//! The root itself is the empty path.

mod local;

pub use local::LocalBackend;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use std::io;

use crate::error::BackendError;

/// Lazily produced file content
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// What kind of object an [`Entry`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File { size: u64 },
}

/// A file or directory as seen at the time of the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub modified: DateTime<Utc>,
    pub kind: EntryKind,
}

impl Entry {
    pub fn directory(path: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified,
            kind: EntryKind::Directory,
        }
    }

    pub fn file(path: impl Into<String>, size: u64, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified,
            kind: EntryKind::File { size },
        }
    }

    /// Last path segment, empty for the root
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Read-only access to a tree of files.
///
/// Implementations are shared by all in-flight requests and must tolerate concurrent calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Lists the immediate children of a directory, in no particular order.
    ///
    /// Fails with [`BackendError::NotFound`] if the directory does not exist and
    /// [`BackendError::NotADirectory`] if the path is a file.
    async fn list(&self, path: &str) -> Result<Vec<Entry>, BackendError>;

    /// Looks up a single entry, `None` if it does not exist.
    async fn stat(&self, path: &str) -> Result<Option<Entry>, BackendError>;

    /// Opens the inclusive byte range `start..=end` of a file.
    ///
    /// The underlying handle lives inside the returned stream and is released when the stream
    /// is dropped, whether or not it was read to the end.
    async fn open_range(&self, path: &str, start: u64, end: u64)
        -> Result<ByteStream, BackendError>;
}

/// Joins a child name onto a backend path
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name() {
        let now = Utc::now();
        assert_eq!(Entry::file("three/a.txt", 3, now).name(), "a.txt");
        assert_eq!(Entry::file("two.txt", 3, now).name(), "two.txt");
        assert_eq!(Entry::directory("", now).name(), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "two.txt"), "two.txt");
        assert_eq!(join("three", "a.txt"), "three/a.txt");
    }
}
