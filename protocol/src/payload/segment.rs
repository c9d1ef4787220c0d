//! Segmentation of encoded order data.
//!
//! Encrypted order data is base64-encoded once and the resulting text is
//! cut into segments. Segments are not independently decodable or
//! decryptable; only their in-order concatenation is meaningful.

use super::error::PayloadError;

/// Split base64 text into segments of at most `segment_size` characters.
///
/// Always returns at least one segment, even for empty input, so that an
/// upload carries at least one transfer phase.
pub fn split_segments(encoded: &str, segment_size: usize) -> Vec<String> {
    let size = segment_size.max(1);
    if encoded.is_empty() {
        return vec![String::new()];
    }
    // Base64 is pure ASCII, so byte offsets are char boundaries.
    encoded
        .as_bytes()
        .chunks(size)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// Concatenate segments in receipt order.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> Result<String, PayloadError> {
    if segments.is_empty() {
        return Err(PayloadError::NoSegments);
    }
    let total = segments.iter().map(|s| s.as_ref().len()).sum();
    let mut joined = String::with_capacity(total);
    for segment in segments {
        // Codecs may pretty-print long base64 across lines.
        joined.extend(segment.as_ref().chars().filter(|c| !c.is_ascii_whitespace()));
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact_and_remainder() {
        assert_eq!(split_segments("AAAABBBBCC", 4), vec!["AAAA", "BBBB", "CC"]);
        assert_eq!(split_segments("AAAABBBB", 4), vec!["AAAA", "BBBB"]);
    }

    #[test]
    fn test_split_small_input_is_single_segment() {
        assert_eq!(split_segments("QQ==", 1024), vec!["QQ=="]);
    }

    #[test]
    fn test_split_empty_yields_one_segment() {
        assert_eq!(split_segments("", 8), vec![String::new()]);
    }

    #[test]
    fn test_join_preserves_order() {
        assert_eq!(join_segments(&["AAA", "BBB"]).unwrap(), "AAABBB");
        assert_eq!(join_segments(&["BBB", "AAA"]).unwrap(), "BBBAAA");
    }

    #[test]
    fn test_join_strips_line_breaks() {
        assert_eq!(join_segments(&["AA\nA", " BBB\r\n"]).unwrap(), "AAABBB");
    }

    #[test]
    fn test_join_rejects_empty_list() {
        let none: [&str; 0] = [];
        assert_eq!(join_segments(&none), Err(PayloadError::NoSegments));
    }

    #[test]
    fn test_split_then_join_is_identity() {
        let encoded = "SGVsbG8sIEVCSUNTIHdvcmxkIQ==";
        for size in 1..=encoded.len() + 1 {
            let parts = split_segments(encoded, size);
            assert!(parts.iter().all(|p| p.len() <= size));
            assert_eq!(join_segments(&parts).unwrap(), encoded);
        }
    }
}
