//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing for public assets (RFC 9110 §14).
//! Multi-range and non-byte units are ignored and answered with the
//! full representation.

/// A parsed byte range within an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position (inclusive)
    pub start: usize,
    /// Last byte position (inclusive), `None` for an open-ended range
    pub end: Option<usize>,
}

impl ByteRange {
    /// Resolve the inclusive end position against the asset size
    #[inline]
    pub fn end_position(self, total_size: usize) -> usize {
        self.end.unwrap_or_else(|| total_size.saturating_sub(1))
    }
}

/// Outcome of parsing a `Range` header
#[derive(Debug)]
pub enum RangeParse {
    /// Range is satisfiable, serve `206 Partial Content`
    Valid(ByteRange),
    /// Range starts beyond the asset, serve `416 Range Not Satisfiable`
    NotSatisfiable,
    /// Header absent, malformed, or unsupported, serve the full asset
    None,
}

/// Parse a `Range` header against an asset of `total_size` bytes
///
/// Accepted forms:
/// - `bytes=0-499` closed range
/// - `bytes=500-` open range to end of asset
/// - `bytes=-200` suffix range (last 200 bytes)
///
/// # Examples
/// ```
/// use community_web::http::range::{parse_range, RangeParse};
///
/// assert!(matches!(parse_range(Some("bytes=0-99"), 1000), RangeParse::Valid(_)));
/// assert!(matches!(parse_range(None, 1000), RangeParse::None));
/// ```
pub fn parse_range(range_header: Option<&str>, total_size: usize) -> RangeParse {
    let Some(spec) = range_header.and_then(|h| h.strip_prefix("bytes=")) else {
        return RangeParse::None;
    };

    // Multi-range requests are legal but not worth the complexity here
    if spec.contains(',') {
        return RangeParse::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParse::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        return parse_suffix(end_str, total_size);
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParse::None;
    };
    if start >= total_size {
        return RangeParse::NotSatisfiable;
    }

    if end_str.is_empty() {
        return RangeParse::Valid(ByteRange { start, end: None });
    }

    let Ok(end) = end_str.parse::<usize>() else {
        return RangeParse::None;
    };
    // RFC 9110 treats an inverted spec as invalid, not unsatisfiable
    if end < start {
        return RangeParse::None;
    }

    RangeParse::Valid(ByteRange {
        start,
        // Clients may ask past EOF, clamp to the last byte
        end: Some(end.min(total_size - 1)),
    })
}

/// Parse a suffix range such as `-200` (the last 200 bytes)
fn parse_suffix(suffix_str: &str, total_size: usize) -> RangeParse {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeParse::None;
    };
    if suffix == 0 || total_size == 0 {
        return RangeParse::NotSatisfiable;
    }

    RangeParse::Valid(ByteRange {
        start: total_size.saturating_sub(suffix),
        end: Some(total_size.saturating_sub(1)),
    })
}
