//! Cryptographic primitives for credential hashing.
//!
//! Provides salt generation, PBKDF2 key derivation and constant-time
//! comparison of derived hashes.

pub mod compare;
pub mod kdf;
pub mod random;
pub mod types;

pub use compare::hashes_equal;
pub use kdf::{KdfParams, Prf, derive_hash};
pub use random::{OsRandom, SecureRandom, generate_salt};
pub use types::{PasswordHash, Salt};

/// Length of a salt (64 bytes).
pub const SALT_LEN: usize = 64;
/// Length of a derived password hash (32 bytes / 256 bits).
pub const HASH_LEN: usize = 32;
/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
