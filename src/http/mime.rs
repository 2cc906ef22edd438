//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use mime_guess::mime;

/// Get MIME Content-Type for a file path
///
/// Text types get an explicit UTF-8 charset, unknown extensions fall back to
/// `application/octet-stream`.
pub fn get_content_type(path: &str) -> String {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
        format!("{guess}; charset=utf-8")
    } else {
        guess.to_string()
    }
}
