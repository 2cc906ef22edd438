//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::io;

use super::RangeSpec;
use crate::backend::ByteStream;

/// Response body shared by every handler: fixed bytes or a lazily read file
pub type Body = UnsyncBoxBody<Bytes, io::Error>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Body with fixed content
pub fn full(data: impl Into<Bytes>) -> Body {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body without content, used for `HEAD`
pub fn empty() -> Body {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body pulling chunks from a backend stream as the client consumes them
pub fn stream(data: ByteStream) -> Body {
    StreamBody::new(data.map_ok(Frame::data)).boxed_unsync()
}

/// Build a plain-text error response such as `404 Not Found`
///
/// Missing and filtered paths get the same 404 body.
pub fn build_error_response(status: StatusCode) -> Response<Body> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, text.len())
        .body(full(text.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(text))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Body> {
    let text = "405 Method Not Allowed";
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, text.len())
        .header(ALLOW, "GET, HEAD")
        .body(full(text))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full(text))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<Body> {
    let text = "416 Range Not Satisfiable";
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, text.len())
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(full(text))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(full(text))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String) -> Response<Body> {
    let content_length = content.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_HTML)
        .header(CONTENT_LENGTH, content_length)
        .body(full(content))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Build 200 OK response for a whole file
pub fn build_full_response(
    body: Body,
    content_type: &str,
    last_modified: &str,
    total_size: u64,
) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, total_size)
        .header(ACCEPT_RANGES, "bytes")
        .header(LAST_MODIFIED, last_modified)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    body: Body,
    content_type: &str,
    last_modified: &str,
    range: RangeSpec,
    total_size: u64,
) -> Response<Body> {
    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(total_size))
        .header(ACCEPT_RANGES, "bytes")
        .header(LAST_MODIFIED, last_modified)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}
