//! Directory listing module
//!
//! Renders the visible children of a directory as an HTML table.

use hyper::Response;
use maud::{html, DOCTYPE};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::backend::{Backend, Entry, EntryKind};
use crate::error::GatewayError;
use crate::filter::Filter;
use crate::http::response::{build_html_response, Body};

/// Characters escaped in listing links. `%` is included so names containing it round-trip.
const LINK_ESC_CHARSET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|')
    .add(b'[')
    .add(b']')
    .add(b':');

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lists `dir` and renders its visible children
pub async fn serve_listing(
    backend: &dyn Backend,
    filter: &Filter,
    dir: &Entry,
) -> Result<Response<Body>, GatewayError> {
    let mut children = backend.list(&dir.path).await?;
    children.retain(|child| filter.is_visible(&child.path, child.is_dir()));

    Ok(build_html_response(render_listing(&dir.path, children)))
}

/// Renders the listing page
///
/// Output only depends on the arguments: children are sorted by name and times are UTC.
pub fn render_listing(dir_path: &str, mut children: Vec<Entry>) -> String {
    children.sort_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
    let title = format!("Directory listing of /{dir_path}");

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                h1 { (title) }
                table {
                    thead {
                        tr {
                            th { "Name" }
                            th { "Size" }
                            th { "Modified" }
                        }
                    }
                    tbody {
                        @for child in &children {
                            tr {
                                td { a href=(link(child)) { (display_name(child)) } }
                                td { (size(child)) }
                                td { (child.modified.format(TIME_FORMAT)) }
                            }
                        }
                    }
                }
            }
        }
    }
    .into()
}

/// Link relative to the listed directory
fn link(entry: &Entry) -> String {
    let encoded = utf8_percent_encode(entry.name(), LINK_ESC_CHARSET).to_string();
    // "./" keeps names like "a:b" from being read as a URL scheme
    if entry.is_dir() {
        format!("./{encoded}/")
    } else {
        format!("./{encoded}")
    }
}

fn display_name(entry: &Entry) -> String {
    if entry.is_dir() {
        format!("{}/", entry.name())
    } else {
        entry.name().to_string()
    }
}

fn size(entry: &Entry) -> String {
    match entry.kind {
        EntryKind::File { size } => size.to_string(),
        EntryKind::Directory => "-".to_string(),
    }
}
