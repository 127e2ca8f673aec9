//! Text encoding for persisting salts and hashes.

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{Engine, alphabet};

use crate::error::CredentialError;

/// Accepts missing padding and stray trailing bits, as older records do.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes as standard, padded base64 on a single line.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, failing on malformed input.
pub fn decode(text: &str) -> Result<Vec<u8>, CredentialError> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CredentialError::Decode(e.to_string()))
}

/// Decode with the fallback older records relied on.
///
/// Padding is optional and whitespace anywhere in the text is ignored. Text
/// that still is not base64 is not rejected: the result is the ASCII of the
/// base64 encoding of the raw text bytes. Prefer [`decode`] for new code.
pub fn decode_lenient(text: &str) -> Vec<u8> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match LENIENT.decode(&compact) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "value is not base64, re-encoding raw text");
            encode(text.as_bytes()).into_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_zero_salt() {
        let bytes = [0u8; 64];
        assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
    }

    #[test]
    fn roundtrip_all_ones_hash() {
        let bytes = [0xFFu8; 32];
        assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
    }

    #[test]
    fn roundtrip_empty() {
        assert_eq!(encode([0u8; 0]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn encoding_is_single_line_standard_alphabet() {
        let text = encode([0xFBu8; 200]);
        assert!(!text.contains('\n'));
        assert!(text.contains('+') || text.contains('/'));
        assert!(!text.contains('-') && !text.contains('_'));
    }

    #[test]
    fn known_value() {
        assert_eq!(encode(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(decode("aGVsbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(decode("no*way"), Err(CredentialError::Decode(_))));
    }

    #[test]
    fn lenient_decode_reencodes_malformed_input() {
        assert_eq!(decode_lenient("no*way"), b"bm8qd2F5".to_vec());
    }

    #[test]
    fn lenient_decode_accepts_missing_padding() {
        assert_eq!(decode_lenient("YWJjZA"), b"abcd");
        assert!(decode("YWJjZA").is_err());
    }

    #[test]
    fn lenient_decode_ignores_embedded_whitespace() {
        assert_eq!(decode_lenient("YWJj\r\nZA=="), b"abcd");
        assert_eq!(decode_lenient(" aGVs bG8= "), b"hello");
    }

    #[test]
    fn lenient_decode_passes_valid_input_through() {
        assert_eq!(decode_lenient("aGVsbG8="), b"hello");
    }
}
