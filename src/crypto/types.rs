use std::fmt;

use super::{HASH_LEN, SALT_LEN};
use crate::encoding;
use crate::error::CredentialError;

/// Per-credential random salt. Not secret, but never reused.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

/// PBKDF2 output stored alongside its [`Salt`].
///
/// Equality through `==` is not constant-time; use
/// [`hashes_equal`](super::hashes_equal) when comparing against a candidate.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PasswordHash([u8; HASH_LEN]);

impl Salt {
    pub fn new(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CredentialError> {
        let bytes: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            CredentialError::invalid_input(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_encoded(text: &str) -> Result<Self, CredentialError> {
        Self::from_slice(&encoding::decode(text)?)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.0)
    }
}

impl PasswordHash {
    pub fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CredentialError> {
        let bytes: [u8; HASH_LEN] = bytes.try_into().map_err(|_| {
            CredentialError::invalid_input(format!(
                "password hash must be {HASH_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_encoded(text: &str) -> Result<Self, CredentialError> {
        Self::from_slice(&encoding::decode(text)?)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_encoded(&self) -> String {
        encoding::encode(self.0)
    }
}

impl AsRef<[u8]> for Salt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for PasswordHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Keep key material out of logs.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt([redacted; {SALT_LEN}])")
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash([redacted; {HASH_LEN}])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_salt_length_is_rejected() {
        match Salt::from_slice(&[0u8; 16]) {
            Err(CredentialError::InvalidInput(msg)) => assert!(msg.contains("got 16")),
            other => panic!("expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn wrong_hash_length_is_rejected() {
        assert!(matches!(
            PasswordHash::from_slice(&[1u8; 33]),
            Err(CredentialError::InvalidInput(_))
        ));
    }

    #[test]
    fn encoded_salt_roundtrip() {
        let salt = Salt::new([0u8; SALT_LEN]);
        let parsed = Salt::from_encoded(&salt.to_encoded()).unwrap();
        assert_eq!(parsed, salt);
    }

    #[test]
    fn encoded_hash_roundtrip() {
        let hash = PasswordHash::new([0xFF; HASH_LEN]);
        let parsed = PasswordHash::from_encoded(&hash.to_encoded()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn malformed_encoding_is_a_decode_error() {
        assert!(matches!(
            Salt::from_encoded("not base64 at all!"),
            Err(CredentialError::Decode(_))
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::new([0xAB; HASH_LEN]);
        let shown = format!("{hash:?}");
        assert!(!shown.contains("171"));
        assert!(shown.contains("redacted"));
    }
}
