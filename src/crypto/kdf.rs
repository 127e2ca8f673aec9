use std::fmt;
use std::str::FromStr;

use hmac::Hmac;
use pbkdf2::pbkdf2;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{DEFAULT_ITERATIONS, HASH_LEN, PasswordHash, Salt};
use crate::error::CredentialError;

/// Pseudorandom function underneath PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Prf {
    /// PBKDF2WithHmacSHA1, the format existing records were written in.
    #[default]
    HmacSha1,
    HmacSha256,
}

impl fmt::Display for Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prf::HmacSha1 => f.write_str("sha1"),
            Prf::HmacSha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for Prf {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "hmac-sha1" => Ok(Prf::HmacSha1),
            "sha256" | "hmac-sha256" => Ok(Prf::HmacSha256),
            other => Err(CredentialError::invalid_input(format!(
                "unknown PRF '{other}', expected sha1 or sha256"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    prf: Prf,
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            prf: Prf::HmacSha1,
            // cost factor
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub fn new(prf: Prf, iterations: u32) -> Result<Self, CredentialError> {
        let params = Self { prf, iterations };
        params.validate()?;
        if iterations < DEFAULT_ITERATIONS {
            tracing::warn!(
                iterations,
                minimum = DEFAULT_ITERATIONS,
                "PBKDF2 iteration count below recommended minimum"
            );
        }
        Ok(params)
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.iterations < 1 {
            return Err(CredentialError::invalid_input(
                "PBKDF2 iteration count must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Derive a password hash with PBKDF2.
pub fn derive_hash(
    password: &str,
    salt: &Salt,
    kdf: KdfParams,
) -> Result<PasswordHash, CredentialError> {
    let mut out = [0u8; HASH_LEN];
    derive_into(password, salt, kdf, &mut out)?;
    Ok(PasswordHash::new(out))
}

/// Derive into a caller-owned buffer, so callers holding transient hashes can
/// wipe them.
///
/// The plaintext is copied into a buffer that is wiped when this function
/// returns, on success and on every error path.
pub(crate) fn derive_into(
    password: &str,
    salt: &Salt,
    kdf: KdfParams,
    out: &mut [u8; HASH_LEN],
) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::invalid_input("password must not be empty"));
    }
    kdf.validate()?;

    let secret = Zeroizing::new(password.as_bytes().to_vec());

    let derived = match kdf.prf {
        Prf::HmacSha1 => pbkdf2::<Hmac<Sha1>>(&secret, salt.as_ref(), kdf.iterations, out),
        Prf::HmacSha256 => pbkdf2::<Hmac<Sha256>>(&secret, salt.as_ref(), kdf.iterations, out),
    };
    derived.map_err(|e| {
        CredentialError::environment(format!("PBKDF2 with HMAC-{} unavailable: {e}", kdf.prf))
    })?;

    tracing::debug!(prf = %kdf.prf, iterations = kdf.iterations, "derived password hash");
    Ok(())
}
