//! Best-effort attributedBody payload decoding.
//!
//! Messages frequently carry their text inside an `attributedBody` blob
//! instead of the plain `text` column. The blob is an archived Cocoa
//! attributed string; rather than parse that format, this module does a
//! byte-level sniff: hex-decode the blob, look for the `NSString` marker,
//! and lift out the first quoted run after it. The decoder is total: any
//! malformed input yields an empty string and the caller falls back to the
//! plain text column.

/// Marker preceding the archived string object inside the decoded blob.
const STRING_MARKER: &str = "NSString";

/// Decode a hex-encoded attributedBody blob into plain text.
///
/// Returns an empty string for absent, empty, or undecodable input.
pub fn decode_attributed_body(hex_blob: Option<&str>) -> String {
    let Some(raw) = hex_blob else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }

    let clean: String = raw.chars().filter(char::is_ascii_hexdigit).collect();
    let bytes = match hex::decode(&clean) {
        Ok(bytes) => bytes,
        Err(_) => return String::new(),
    };
    let decoded = String::from_utf8_lossy(&bytes);

    if let Some(marker) = decoded.find(STRING_MARKER) {
        if let Some(open) = decoded[marker..].find('"').map(|i| marker + i) {
            if let Some(close) = decoded[open + 1..].find('"').map(|i| open + 1 + i) {
                return decoded[open + 1..close].to_string();
            }
        }
    }

    decoded.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(text: &str) -> String {
        hex::encode(text.as_bytes())
    }

    #[test]
    fn extracts_marker_delimited_string() {
        let blob = hex_of("streamtyped@NSAttributedString NSString \"Hello world\" extras");
        assert_eq!(decode_attributed_body(Some(&blob)), "Hello world");
    }

    #[test]
    fn marker_without_quotes_falls_back_to_trimmed_text() {
        let blob = hex_of("  NSString but no quoted content  ");
        assert_eq!(
            decode_attributed_body(Some(&blob)),
            "NSString but no quoted content"
        );
    }

    #[test]
    fn no_marker_falls_back_to_trimmed_text() {
        let blob = hex_of("  just some plain bytes  ");
        assert_eq!(decode_attributed_body(Some(&blob)), "just some plain bytes");
    }

    #[test]
    fn non_hex_characters_are_stripped() {
        // "Hi" with separators that must be ignored before decoding.
        assert_eq!(decode_attributed_body(Some("48 69")), "Hi");
        assert_eq!(decode_attributed_body(Some("48:69\n")), "Hi");
    }

    #[test]
    fn absent_or_empty_input_yields_empty() {
        assert_eq!(decode_attributed_body(None), "");
        assert_eq!(decode_attributed_body(Some("")), "");
    }

    #[test]
    fn odd_length_hex_yields_empty() {
        assert_eq!(decode_attributed_body(Some("abc")), "");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        // 0xff is not valid UTF-8; the rest of the text must survive.
        let blob = format!("{}ff{}", hex_of("abc"), hex_of("def"));
        let decoded = decode_attributed_body(Some(&blob));
        assert!(decoded.starts_with("abc"));
        assert!(decoded.ends_with("def"));
    }
}
