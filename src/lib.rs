pub mod crypto;
pub mod encoding;
mod error;
mod hasher;
mod storage;
mod store;

pub use crate::crypto::{
    DEFAULT_ITERATIONS, HASH_LEN, KdfParams, OsRandom, PasswordHash, Prf, SALT_LEN, Salt,
    SecureRandom,
};
pub use crate::encoding::{decode, decode_lenient, encode};
pub use crate::error::{CredentialError, StoreError};
pub use crate::hasher::{CredentialHasher, verify_with};
pub use crate::storage::Storage;
pub use crate::store::{CredentialRecord, CredentialStore};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// File-backed set of user credentials.
///
/// Holds the loaded store in memory; mutations are persisted with
/// [`save`](Self::save).
pub struct Registry<R = OsRandom> {
    store: CredentialStore,
    storage: Storage,
    hasher: CredentialHasher<R>,
}

impl Registry<OsRandom> {
    pub fn open(storage: Storage) -> Result<Self> {
        Self::open_with_hasher(storage, CredentialHasher::new())
    }
}

impl<R: SecureRandom> Registry<R> {
    pub fn open_with_hasher(storage: Storage, hasher: CredentialHasher<R>) -> Result<Self> {
        let store = storage.load()?;
        tracing::debug!(users = store.len(), "opened credential registry");
        Ok(Self {
            store,
            storage,
            hasher,
        })
    }

    /// Hash `password` under a fresh salt and record it for `username`.
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || username.trim() != username {
            return Err(CredentialError::invalid_input(
                "username must not be empty or padded with whitespace",
            )
            .into());
        }
        if self.store.get(username).is_some() {
            return Err(StoreError::UserAlreadyExists(username.to_string()).into());
        }

        let (salt, hash) = self
            .hasher
            .create(password)
            .context("failed to hash password")?;
        let record = CredentialRecord::new(username.to_string(), &salt, &hash, self.hasher.kdf());
        self.store.insert(record)?;

        tracing::info!(username, "added user");
        Ok(())
    }

    /// Check a login attempt.
    ///
    /// A wrong password is `Ok(false)` and bumps the record's failed attempt
    /// counter; unknown users and malformed records are errors.
    pub fn verify_user(&mut self, username: &str, password: &str) -> Result<bool> {
        let record = self.store.get_mut(username)?;
        let salt = record
            .salt()
            .with_context(|| format!("stored salt for '{username}' is unusable"))?;
        let expected = record
            .hash()
            .with_context(|| format!("stored hash for '{username}' is unusable"))?;

        let accepted = verify_with(password, &salt, expected.as_ref(), record.kdf())?;
        record.record_attempt(accepted);

        if accepted {
            tracing::info!(username, "password accepted");
        } else {
            tracing::warn!(
                username,
                failed_attempts = record.failed_attempts(),
                "password rejected"
            );
        }
        Ok(accepted)
    }

    pub fn remove_user(&mut self, username: &str) -> Result<()> {
        self.store.remove(username)?;
        tracing::info!(username, "removed user");
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.store.get(username)
    }

    pub fn list(&self) -> Vec<&str> {
        self.store.usernames().collect()
    }

    pub fn list_all(&self) -> Vec<&CredentialRecord> {
        self.store.records().collect()
    }

    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.store)
    }
}

pub fn default_storage() -> Result<Storage> {
    let project_dirs = ProjectDirs::from("", "", "saltcellar")
        .context("could not determine platform directories")?;

    Ok(Storage::new(project_dirs.data_dir().join("credentials.json")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new().with_kdf(KdfParams::new(Prf::HmacSha256, 10).unwrap())
    }

    fn registry(dir: &tempfile::TempDir) -> Registry {
        let storage = Storage::new(dir.path().join("credentials.json"));
        Registry::open_with_hasher(storage, fast_hasher()).unwrap()
    }

    #[test]
    fn add_save_and_verify_after_reopen() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "wonderland").unwrap();
        reg.save().unwrap();

        let mut reg = registry(&dir);
        assert!(reg.verify_user("alice", "wonderland").unwrap());
        assert!(!reg.verify_user("alice", "wonderland ").unwrap());
    }

    #[test]
    fn default_parameters_verify() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("credentials.json"));
        let mut reg = Registry::open(storage).unwrap();
        reg.add_user("alice", "correct horse").unwrap();

        let rec = reg.get("alice").unwrap();
        assert_eq!(rec.kdf(), KdfParams::default());
        assert!(reg.verify_user("alice", "correct horse").unwrap());
    }

    #[test]
    fn records_keep_their_own_parameters() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "pw").unwrap();
        reg.save().unwrap();

        // reopen with different defaults for new users
        let storage = Storage::new(dir.path().join("credentials.json"));
        let hasher = CredentialHasher::new().with_kdf(KdfParams::new(Prf::HmacSha1, 20).unwrap());
        let mut reg = Registry::open_with_hasher(storage, hasher).unwrap();
        assert!(reg.verify_user("alice", "pw").unwrap());
    }

    #[test]
    fn same_password_gets_different_salt_and_hash() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "same").unwrap();
        reg.add_user("bob", "same").unwrap();

        let a = reg.get("alice").unwrap();
        let b = reg.get("bob").unwrap();
        assert_ne!(a.encoded_salt(), b.encoded_salt());
        assert_ne!(a.encoded_hash(), b.encoded_hash());
    }

    #[test]
    fn adding_existing_user_fails() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "pw").unwrap();

        let err = reg.add_user("alice", "other").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::UserAlreadyExists(_))
        ));
    }

    #[test]
    fn empty_password_is_rejected() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        let err = reg.add_user("alice", "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CredentialError>(),
            Some(CredentialError::InvalidInput(_))
        ));
        assert!(reg.list().is_empty());
    }

    #[test]
    fn padded_usernames_are_rejected() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "pw").unwrap();

        for name in [" alice", "alice ", "\talice", "   ", ""] {
            let err = reg.add_user(name, "pw").unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CredentialError>(),
                Some(CredentialError::InvalidInput(_))
            ));
        }
        assert_eq!(reg.list(), ["alice"]);
    }

    #[test]
    fn verifying_unknown_user_is_an_error() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        let err = reg.verify_user("ghost", "pw").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::UserNotFound(_))
        ));
    }

    #[test]
    fn failed_attempts_are_counted_and_persisted() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "pw").unwrap();
        assert!(!reg.verify_user("alice", "nope").unwrap());
        assert!(!reg.verify_user("alice", "nope").unwrap());
        reg.save().unwrap();

        let mut reg = registry(&dir);
        assert_eq!(reg.get("alice").unwrap().failed_attempts(), 2);
        assert!(reg.verify_user("alice", "pw").unwrap());
        assert_eq!(reg.get("alice").unwrap().failed_attempts(), 0);
    }

    #[test]
    fn removing_user_works() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("alice", "pw").unwrap();
        reg.remove_user("alice").unwrap();
        assert!(reg.get("alice").is_none());
        assert!(reg.remove_user("alice").is_err());
    }

    #[test]
    fn list_works() {
        let dir = tempdir().unwrap();
        let mut reg = registry(&dir);
        reg.add_user("bob", "pw").unwrap();
        reg.add_user("alice", "pw").unwrap();

        assert_eq!(reg.list(), ["alice", "bob"]);
        for rec in reg.list_all() {
            assert_ne!(rec.created(), "");
        }
    }
}
