//! Small helpers shared by the book sources.

use std::borrow::Cow;

/// Decode page source bytes to a string.
///
/// Tries UTF-8 first (a BOM is stripped by encoding_rs) and falls back to
/// Windows-1252.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBF# Title"), "# Title");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xE9 is 'é' in Windows-1252 and invalid as a lone UTF-8 byte.
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }
}
