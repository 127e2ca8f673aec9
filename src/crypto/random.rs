use super::{SALT_LEN, Salt};
use crate::error::CredentialError;
use getrandom::fill;

/// Source of cryptographically secure random bytes.
///
/// Implementations must be safe to call from several threads at once.
pub trait SecureRandom: Send + Sync {
    /// Fill `buf` entirely, or fail. Never fall back to weaker randomness.
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), CredentialError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), CredentialError> {
        fill(buf).map_err(|e| {
            CredentialError::environment(format!("OS random generator unavailable: {e}"))
        })
    }
}

impl<R: SecureRandom + ?Sized> SecureRandom for &R {
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), CredentialError> {
        (**self).fill_bytes(buf)
    }
}

/// Generate a fresh salt from `rng`.
pub fn generate_salt<R: SecureRandom + ?Sized>(rng: &R) -> Result<Salt, CredentialError> {
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt)?;
    Ok(Salt::new(salt))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic counter-based source. Not random, only distinct.
    #[derive(Default)]
    pub struct CountingRandom {
        next: AtomicU64,
    }

    impl SecureRandom for CountingRandom {
        fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), CredentialError> {
            let n = self.next.fetch_add(1, Ordering::Relaxed).to_le_bytes();
            for (i, b) in buf.iter_mut().enumerate() {
                *b = n[i % n.len()] ^ (i as u8);
            }
            Ok(())
        }
    }

    pub struct BrokenRandom;

    impl SecureRandom for BrokenRandom {
        fn fill_bytes(&self, _buf: &mut [u8]) -> Result<(), CredentialError> {
            Err(CredentialError::environment("entropy source offline"))
        }
    }
}
