//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the served tree.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, RangeParseResult, RangeSpec};
pub use response::{build_405_response, build_416_response, build_error_response, Body};
