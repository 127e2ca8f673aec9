//! Salted password hashing and verification.

use zeroize::Zeroizing;

use crate::crypto::{
    self, HASH_LEN, KdfParams, OsRandom, PasswordHash, Salt, SecureRandom, hashes_equal,
};
use crate::error::CredentialError;

/// Produces and checks salted PBKDF2 password hashes.
///
/// The only state is the randomness source used for salts and the KDF
/// parameters applied to new hashes.
#[derive(Debug, Clone)]
pub struct CredentialHasher<R = OsRandom> {
    rng: R,
    kdf: KdfParams,
}

impl CredentialHasher<OsRandom> {
    pub fn new() -> Self {
        Self::with_rng(OsRandom)
    }
}

impl Default for CredentialHasher<OsRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SecureRandom> CredentialHasher<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            kdf: KdfParams::default(),
        }
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    pub fn generate_salt(&self) -> Result<Salt, CredentialError> {
        crypto::generate_salt(&self.rng)
    }

    pub fn hash(&self, password: &str, salt: &Salt) -> Result<PasswordHash, CredentialError> {
        crypto::derive_hash(password, salt, self.kdf)
    }

    /// Fresh salt and matching hash for a new credential.
    pub fn create(&self, password: &str) -> Result<(Salt, PasswordHash), CredentialError> {
        // reject before drawing entropy
        if password.is_empty() {
            return Err(CredentialError::invalid_input("password must not be empty"));
        }
        let salt = self.generate_salt()?;
        let hash = self.hash(password, &salt)?;
        Ok((salt, hash))
    }

    /// Check `password` against a stored salt and hash.
    ///
    /// A mismatch is `Ok(false)`. Errors are reserved for bad input and an
    /// unusable environment.
    pub fn verify(
        &self,
        password: &str,
        salt: &Salt,
        expected: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        verify_with(password, salt, expected.as_ref(), self.kdf)
    }

    /// Like [`verify`](Self::verify), for base64 text as persisted by callers.
    pub fn verify_encoded(
        &self,
        password: &str,
        salt: &str,
        expected: &str,
    ) -> Result<bool, CredentialError> {
        let salt = Salt::from_encoded(salt)?;
        let expected = PasswordHash::from_encoded(expected)?;
        self.verify(password, &salt, &expected)
    }
}

/// Verify against a hash produced with explicit parameters, e.g. a record
/// written before the defaults changed.
pub fn verify_with(
    password: &str,
    salt: &Salt,
    expected: &[u8],
    kdf: KdfParams,
) -> Result<bool, CredentialError> {
    let mut candidate = Zeroizing::new([0u8; HASH_LEN]);
    crypto::kdf::derive_into(password, salt, kdf, &mut candidate)?;
    let matched = hashes_equal(candidate.as_slice(), expected);
    if !matched {
        tracing::debug!("password did not match stored hash");
    }
    Ok(matched)
}
