//! Content length extraction utilities.
//!
//! The hub answers metadata probes for large (LFS) files with an
//! `X-Linked-Size` header describing the real file, while `Content-Length`
//! may describe a redirect body. Ranged responses carry the full size in
//! `Content-Range` instead.

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE};

/// Header the hub uses to advertise the size of LFS-backed files.
pub const X_LINKED_SIZE: &str = "x-linked-size";

/// Size of the remote file described by a probe or GET response.
///
/// Prefers `X-Linked-Size`, then the total from `Content-Range`, then
/// `Content-Length`. Returns `None` when none of them holds a valid number.
pub fn remote_size(headers: &HeaderMap) -> Option<u64> {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    header_u64(X_LINKED_SIZE)
        .or_else(|| {
            headers
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total)
        })
        .or_else(|| header_u64(CONTENT_LENGTH.as_str()))
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total" or "bytes */total".
///
/// ```rust
/// use hubfetch::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes */2048"), Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.split_once('/')?;
    total.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
        assert_eq!(parse_content_range_total("bytes 200-1023/5000"), Some(5000));
        assert_eq!(parse_content_range_total("bytes */10"), Some(10));
        assert_eq!(parse_content_range_total("bytes 0-1023/ 2048 "), Some(2048));
        assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
        assert_eq!(parse_content_range_total("bytes 0-1023"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[test]
    fn test_remote_size_prefers_linked_size() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1178"));
        headers.insert(X_LINKED_SIZE, HeaderValue::from_static("4400000000"));
        assert_eq!(remote_size(&headers), Some(4_400_000_000));
    }

    #[test]
    fn test_remote_size_from_content_range() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("24"));
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 76-99/100"));
        assert_eq!(remote_size(&headers), Some(100));
    }

    #[test]
    fn test_remote_size_falls_back_to_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(remote_size(&headers), Some(42));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("not-a-number"));
        assert_eq!(remote_size(&headers), None);
        assert_eq!(remote_size(&HeaderMap::new()), None);
    }
}
