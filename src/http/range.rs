//! HTTP Range request parsing module
//!
//! Single byte ranges only, in the `bytes=start-end` and `bytes=start-` forms. Anything else
//! carried in a `Range` header is answered with 416.

/// Validated byte range, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
}

impl RangeSpec {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for a file of `total_size` bytes
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No Range header, serve the whole file
    None,
    /// Range within the file, `0 <= start <= end < file_size`
    Valid(RangeSpec),
    /// Malformed, unsupported or out of bounds - should return 416
    NotSatisfiable,
}

/// Parse HTTP Range header against the size of the file it refers to
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, `end` must lie inside the file
/// - `bytes=start-` - From start to end of file
///
/// Suffix ranges (`bytes=-500`), multiple ranges and other units are rejected.
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::NotSatisfiable;
    };

    // Only support single range (not multi-range)
    if spec.contains(',') {
        return RangeParseResult::NotSatisfiable;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::NotSatisfiable;
    };

    let Some(start) = parse_position(start_str) else {
        return RangeParseResult::NotSatisfiable;
    };

    // Start beyond file size is not satisfiable, this also covers empty files
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.trim().is_empty() {
        file_size - 1
    } else {
        match parse_position(end_str) {
            Some(end) => end,
            None => return RangeParseResult::NotSatisfiable,
        }
    };

    if end >= file_size || start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(RangeSpec { start, end })
}

/// Digits only, `u64::from_str` alone would accept a leading `+`
fn parse_position(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
