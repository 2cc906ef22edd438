//! Request handler module
//!
//! Turns a request into a response: method check, path resolution against the backend and the
//! filter, then either a directory listing or file content.

pub mod content;
pub mod listing;
pub mod resolve;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
