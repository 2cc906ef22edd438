//! File content module
//!
//! Serves whole files and single byte ranges. Bodies are streamed from the backend; nothing is
//! opened for `HEAD`, empty files or unsatisfiable ranges.

use hyper::Response;

use crate::backend::{Backend, Entry, EntryKind};
use crate::error::GatewayError;
use crate::http::response::{self, build_full_response, build_partial_response, Body};
use crate::http::{mime, parse_range_header, RangeParseResult};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Serves the content of `file` according to the `Range` header
pub async fn serve_content(
    backend: &dyn Backend,
    file: &Entry,
    range_header: Option<&str>,
    is_head: bool,
) -> Result<Response<Body>, GatewayError> {
    let EntryKind::File { size } = file.kind else {
        return Err(GatewayError::NotFound);
    };

    let content_type = mime::get_content_type(&file.path);
    let last_modified = file.modified.format(HTTP_DATE_FORMAT).to_string();

    match parse_range_header(range_header, size) {
        RangeParseResult::None => {
            let body = if is_head || size == 0 {
                response::empty()
            } else {
                response::stream(backend.open_range(&file.path, 0, size - 1).await?)
            };
            Ok(build_full_response(body, &content_type, &last_modified, size))
        }
        RangeParseResult::Valid(range) => {
            let body = if is_head {
                response::empty()
            } else {
                response::stream(backend.open_range(&file.path, range.start, range.end).await?)
            };
            Ok(build_partial_response(
                body,
                &content_type,
                &last_modified,
                range,
                size,
            ))
        }
        RangeParseResult::NotSatisfiable => Err(GatewayError::RangeUnsatisfiable { size }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ByteStream;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED};
    use hyper::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed buffer for every path and counts opened streams
    struct MemoryBackend {
        data: &'static [u8],
        opened: AtomicUsize,
    }

    impl MemoryBackend {
        const fn new(data: &'static [u8]) -> Self {
            Self {
                data,
                opened: AtomicUsize::new(0),
            }
        }

        fn entry(&self, path: &str) -> Entry {
            let modified = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
            Entry::file(path, self.data.len() as u64, modified)
        }
    }

    #[async_trait]
    impl Backend for MemoryBackend {
        async fn list(&self, _path: &str) -> Result<Vec<Entry>, BackendError> {
            Err(BackendError::NotADirectory)
        }

        async fn stat(&self, path: &str) -> Result<Option<Entry>, BackendError> {
            Ok(Some(self.entry(path)))
        }

        async fn open_range(
            &self,
            _path: &str,
            start: u64,
            end: u64,
        ) -> Result<ByteStream, BackendError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let slice = bytes::Bytes::from_static(&self.data[start as usize..=end as usize]);
            Ok(Box::pin(futures_util::stream::iter([Ok::<_, std::io::Error>(slice)])))
        }
    }

    async fn body(response: Response<Body>) -> bytes::Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_full_content() {
        let backend = MemoryBackend::new(b"0123456789\n");
        let entry = backend.entry("two.txt");
        let response = serve_content(&backend, &entry, None, false).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "11");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(
            response.headers()[LAST_MODIFIED],
            "Mon, 06 May 2024 07:08:09 GMT"
        );
        assert_eq!(body(response).await, "0123456789\n");
    }

    #[tokio::test]
    async fn test_partial_content() {
        let backend = MemoryBackend::new(b"0123456789\n");
        let entry = backend.entry("two.txt");
        let response = serve_content(&backend, &entry, Some("bytes=2-5"), false)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 2-5/11");
        assert_eq!(body(response).await, "2345");
    }

    #[tokio::test]
    async fn test_head_opens_nothing() {
        let backend = MemoryBackend::new(b"0123456789\n");
        let entry = backend.entry("two.txt");

        let full = serve_content(&backend, &entry, None, true).await.unwrap();
        assert_eq!(full.headers()[CONTENT_LENGTH], "11");
        assert!(body(full).await.is_empty());

        let partial = serve_content(&backend, &entry, Some("bytes=3-"), true)
            .await
            .unwrap();
        assert_eq!(partial.headers()[CONTENT_RANGE], "bytes 3-10/11");
        assert!(body(partial).await.is_empty());

        assert_eq!(backend.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsatisfiable_opens_nothing() {
        let backend = MemoryBackend::new(b"0123456789\n");
        let entry = backend.entry("two.txt");

        for header in ["bytes=11-", "bytes=5-2", "bytes=-3", "bytes=0-1,3-4", "items=0-1"] {
            let result = serve_content(&backend, &entry, Some(header), false).await;
            assert!(
                matches!(result, Err(GatewayError::RangeUnsatisfiable { size: 11 })),
                "{header}"
            );
        }
        assert_eq!(backend.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_file() {
        let backend = MemoryBackend::new(b"");
        let entry = backend.entry("empty.bin");
        let response = serve_content(&backend, &entry, None, false).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert!(body(response).await.is_empty());
        assert_eq!(backend.opened.load(Ordering::SeqCst), 0);
    }
}
