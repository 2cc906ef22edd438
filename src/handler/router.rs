//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, path resolution
//! and dispatching to the listing or content handlers.

use hyper::header::{HeaderValue, CONTENT_LENGTH, RANGE, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::EntryKind;
use crate::config::AppState;
use crate::error::GatewayError;
use crate::handler::{content, listing, resolve};
use crate::http::{self, Body};
use crate::logger::{self, AccessLogEntry};

/// Request context, built once and read-only afterwards
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            path: req.uri().path(),
            is_head: *req.method() == Method::HEAD,
            range_header: req.headers().get(RANGE).and_then(|v| v.to_str().ok()),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let mut response = match route_request(&ctx, &state).await {
        Ok(response) => response,
        Err(err) => error_response(&ctx, &err),
    };

    if ctx.is_head {
        response = strip_body(response);
    }

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::from_request(
            &peer_addr,
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        );
        entry.status = response.status().as_u16();
        entry.body_bytes = if ctx.is_head {
            0
        } else {
            content_length(&response)
        };
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the path and dispatch by entry kind
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<Body>, GatewayError> {
    // Checked before anything touches the backend
    check_http_method(ctx.method)?;

    let backend = state.backend.as_ref();
    let entry = resolve::resolve(backend, &state.filter, ctx.path).await?;

    match entry.kind {
        EntryKind::Directory => listing::serve_listing(backend, &state.filter, &entry).await,
        EntryKind::File { .. } => {
            content::serve_content(backend, &entry, ctx.range_header, ctx.is_head).await
        }
    }
}

/// Only `GET` and `HEAD` are served
fn check_http_method(method: &Method) -> Result<(), GatewayError> {
    match *method {
        Method::GET | Method::HEAD => Ok(()),
        _ => Err(GatewayError::MethodNotAllowed(method.clone())),
    }
}

/// Map a request failure onto its response
fn error_response(ctx: &RequestContext<'_>, err: &GatewayError) -> Response<Body> {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(path = %ctx.path, error = %err, "request failed");
    }
    match err {
        GatewayError::MethodNotAllowed(method) => {
            logger::log_warning(&format!("Method not allowed: {method} {}", ctx.path));
            http::build_405_response()
        }
        GatewayError::RangeUnsatisfiable { size } => http::build_416_response(*size),
        GatewayError::NotFound | GatewayError::Backend(_) => http::build_error_response(status),
    }
}

/// Drop the body of a `HEAD` response, headers stay as computed for `GET`
fn strip_body(response: Response<Body>) -> Response<Body> {
    let (parts, _body) = response.into_parts();
    Response::from_parts(parts, http::response::empty())
}

fn content_length(response: &Response<Body>) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
