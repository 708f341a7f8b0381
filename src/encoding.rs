//! Percent-encoding of book ids for URL path segments.

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::config::ConfigError;

/// Characters the manual encoder passes through unchanged.
///
/// Same set as ECMAScript `encodeURIComponent`: alphanumerics and `-_.!~*'()`.
#[must_use]
pub fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// Percent-encodes `input` for use as one path segment.
///
/// Unreserved ASCII passes through; every other byte of the UTF-8 encoding is
/// written as `%XX` with uppercase hex, so multi-byte characters become one
/// escape per byte.
#[must_use]
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if is_unreserved(byte) {
            out.push(char::from(byte));
        } else {
            // Writing to a String cannot fail.
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Decodes a percent-encoded component.
///
/// Returns `None` when the decoded bytes are not valid UTF-8.
#[must_use]
pub fn decode_component(input: &str) -> Option<String> {
    urlencoding::decode(input).ok().map(Cow::into_owned)
}

/// Which encoder turns book ids into path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdEncoder {
    /// The `urlencoding` crate (RFC 3986 unreserved set).
    ///
    /// Unlike `encodeURIComponent` and [`Manual`](Self::Manual), this also
    /// escapes `!*'()`, so `O'Reilly` becomes `O%27Reilly`. Both forms decode
    /// to the same id on the server.
    #[default]
    Standard,
    /// [`encode_component`].
    Manual,
}

impl IdEncoder {
    /// Encodes `id` with this encoder.
    #[must_use]
    pub fn encode(self, id: &str) -> String {
        match self {
            Self::Standard => urlencoding::encode(id).into_owned(),
            Self::Manual => encode_component(id),
        }
    }

    /// Stable label used in config files and flags.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for IdEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdEncoder {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "manual" => Ok(Self::Manual),
            _ => Err(ConfigError::invalid_choice(
                "encoder",
                value,
                "standard, manual",
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_passes_unreserved() {
        assert_eq!(
            encode_component("AZaz09-_.!~*'()"),
            "AZaz09-_.!~*'()"
        );
    }

    #[test]
    fn test_encode_component_escapes_reserved_ascii() {
        assert_eq!(encode_component("a b/c?d#e&f"), "a%20b%2Fc%3Fd%23e%26f");
        assert_eq!(encode_component("100%"), "100%25");
    }

    #[test]
    fn test_encode_component_pads_low_control_bytes() {
        assert_eq!(encode_component("\n\t"), "%0A%09");
    }

    #[test]
    fn test_encode_component_encodes_utf8_bytes() {
        assert_eq!(encode_component("书"), "%E4%B9%A6");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_encode_component_empty() {
        assert_eq!(encode_component(""), "");
    }

    #[test]
    fn test_manual_round_trip_mixed_characters() {
        let ids = [
            "book-001",
            "a b&c=d/e?f#g",
            "O'Reilly (2nd ed.)!",
            "三体 / The Three-Body Problem",
            "100% pure ~*",
            "emoji 📚 id",
        ];
        for id in ids {
            let encoded = encode_component(id);
            assert!(!encoded.contains(' '), "space must be escaped: {encoded}");
            assert!(!encoded.contains('/'), "slash must be escaped: {encoded}");
            assert_eq!(decode_component(&encoded).unwrap(), id);
        }
    }

    #[test]
    fn test_standard_round_trip_mixed_characters() {
        for id in ["x/y z", "三体", "O'Reilly"] {
            let encoded = IdEncoder::Standard.encode(id);
            assert_eq!(decode_component(&encoded).unwrap(), id);
        }
    }

    #[test]
    fn test_standard_and_manual_differ_only_on_sub_delims() {
        assert_eq!(IdEncoder::Manual.encode("it's"), "it's");
        assert_eq!(IdEncoder::Standard.encode("it's"), "it%27s");
        assert_eq!(IdEncoder::Standard.encode("O'Reilly"), "O%27Reilly");
        assert_eq!(IdEncoder::Standard.encode("!*()"), "%21%2A%28%29");
        assert_eq!(IdEncoder::Manual.encode("!*()"), "!*()");
        assert_eq!(
            IdEncoder::Manual.encode("a b"),
            IdEncoder::Standard.encode("a b")
        );
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode_component("%FF%FE").is_none());
    }

    #[test]
    fn test_id_encoder_from_str() {
        assert_eq!("Manual".parse::<IdEncoder>().unwrap(), IdEncoder::Manual);
        assert!("base64".parse::<IdEncoder>().is_err());
    }
}
