//! Local disk backend
//!
//! Serves a directory of the local filesystem. Symbolic links are skipped unless
//! `follow_symlinks` is set, in which case they are resolved like regular entries.

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};

use super::{join, Backend, ByteStream, Entry};
use crate::error::BackendError;

const BUFFER_SIZE: u64 = 64 * 1024;

/// Backend reading from a directory on the local disk
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    follow_symlinks: bool,
}

impl LocalBackend {
    /// Creates a backend rooted at `root`. The path is canonicalized and must be a directory.
    pub fn new(root: impl AsRef<Path>, follow_symlinks: bool) -> Result<Self, BackendError> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|err| BackendError::io("canonicalize", root, err))?;
        if !canonical.is_dir() {
            return Err(BackendError::NotADirectory);
        }

        debug!(root = %canonical.display(), follow_symlinks, "local backend ready");
        Ok(Self {
            root: canonical,
            follow_symlinks,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a backend path onto the disk, `None` if an ancestor is not a directory.
    ///
    /// Ancestors follow the same symlink policy as the entry itself.
    async fn full_path(&self, path: &str) -> Result<Option<PathBuf>, BackendError> {
        let mut full = self.root.clone();
        let mut segments = path.split('/').filter((|s| !s.is_empty()) as fn(&&str) -> bool).peekable();
        while let Some(segment) = segments.next() {
            full.push(segment);
            if segments.peek().is_none() {
                break;
            }
            match self.metadata(&full).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => return Ok(None),
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(BackendError::io("stat", full, err)),
            }
        }
        Ok(Some(full))
    }

    async fn metadata(&self, full: &Path) -> io::Result<Metadata> {
        if self.follow_symlinks {
            fs::metadata(full).await
        } else {
            fs::symlink_metadata(full).await
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list(&self, path: &str) -> Result<Vec<Entry>, BackendError> {
        match self.stat(path).await? {
            Some(entry) if entry.is_dir() => {}
            Some(_) => return Err(BackendError::NotADirectory),
            None => return Err(BackendError::NotFound),
        }
        let full = self.full_path(path).await?.ok_or(BackendError::NotFound)?;

        let mut dir = fs::read_dir(&full)
            .await
            .map_err(|err| BackendError::io("read_dir", &full, err))?;

        let mut entries = Vec::new();
        while let Some(child) = dir
            .next_entry()
            .await
            .map_err(|err| BackendError::io("read_dir", &full, err))?
        {
            let file_name = child.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(dir = %full.display(), name = ?file_name, "skipping non UTF-8 file name");
                continue;
            };

            let meta = if self.follow_symlinks {
                fs::metadata(child.path()).await
            } else {
                child.metadata().await
            };
            match meta {
                Ok(meta) => {
                    if let Some(entry) = entry_from_metadata(join(path, name), &meta) {
                        entries.push(entry);
                    }
                }
                Err(err) => warn!(path = %child.path().display(), "skipping unreadable entry: {err}"),
            }
        }

        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<Option<Entry>, BackendError> {
        let Some(full) = self.full_path(path).await? else {
            return Ok(None);
        };
        match self.metadata(&full).await {
            Ok(meta) => Ok(entry_from_metadata(path.to_string(), &meta)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BackendError::io("stat", full, err)),
        }
    }

    async fn open_range(
        &self,
        path: &str,
        start: u64,
        end: u64,
    ) -> Result<ByteStream, BackendError> {
        // Same visibility rules as `stat`, a hidden link is not opened
        match self.stat(path).await? {
            Some(entry) if !entry.is_dir() => {}
            _ => return Err(BackendError::NotFound),
        }
        let full = self.full_path(path).await?.ok_or(BackendError::NotFound)?;
        let mut file = File::open(&full)
            .await
            .map_err(|err| BackendError::io("open", &full, err))?;

        if start != 0 {
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(|err| BackendError::io("seek", &full, err))?;
        }

        Ok(read_chunks(file, end - start + 1, full))
    }
}

/// Streams `remaining` bytes from the current position of `file` in bounded chunks.
///
/// The file is owned by the stream, dropping the stream closes it.
fn read_chunks(file: File, remaining: u64, path: PathBuf) -> ByteStream {
    stream::try_unfold((file, remaining), move |(mut file, remaining)| {
        let path = path.clone();
        async move {
            if remaining == 0 {
                return Ok::<_, io::Error>(None);
            }

            let want = usize::try_from(remaining.min(BUFFER_SIZE)).unwrap_or(usize::MAX);
            let mut buf = BytesMut::zeroed(want);
            let len = file.read(buf.as_mut()).await?;
            if len == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("{} ended with {remaining} bytes left", path.display()),
                ));
            }

            buf.truncate(len);
            Ok(Some((buf.freeze(), (file, remaining - len as u64))))
        }
    })
    .boxed()
}

/// Symbolic links (when not followed) and special files produce `None`
fn entry_from_metadata(path: String, meta: &Metadata) -> Option<Entry> {
    let modified: DateTime<Utc> = meta
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .into();

    if meta.is_dir() {
        Some(Entry::directory(path, modified))
    } else if meta.is_file() {
        Some(Entry::file(path, meta.len(), modified))
    } else {
        None
    }
}
