use crate::crypto::{KdfParams, PasswordHash, Salt};
use crate::error::{CredentialError, StoreError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, CredentialRecord>,
    creation_date: String,
}

/// Persisted form of a credential: base64 hash and salt plus the parameters
/// the hash was derived with.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialRecord {
    username: String,
    hash: String,
    salt: String,
    // records written before parameters were stored use the defaults
    #[serde(default)]
    kdf: KdfParams,
    created: String,
    #[serde(default)]
    failed_attempts: u32,
}

impl CredentialRecord {
    pub(crate) fn new(username: String, salt: &Salt, hash: &PasswordHash, kdf: KdfParams) -> Self {
        Self {
            username,
            hash: hash.to_encoded(),
            salt: salt.to_encoded(),
            kdf,
            created: Local::now().to_string(),
            failed_attempts: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    pub fn created(&self) -> &str {
        &self.created
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn encoded_salt(&self) -> &str {
        &self.salt
    }

    pub fn encoded_hash(&self) -> &str {
        &self.hash
    }

    pub fn salt(&self) -> Result<Salt, CredentialError> {
        Salt::from_encoded(&self.salt)
    }

    pub fn hash(&self) -> Result<PasswordHash, CredentialError> {
        PasswordHash::from_encoded(&self.hash)
    }

    pub(crate) fn record_attempt(&mut self, accepted: bool) {
        if accepted {
            self.failed_attempts = 0;
        } else {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
        }
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        CredentialStore {
            users: BTreeMap::new(),
            creation_date: Local::now().to_string(),
        }
    }

    pub fn insert(&mut self, record: CredentialRecord) -> Result<(), StoreError> {
        if self.users.contains_key(record.username()) {
            Err(StoreError::UserAlreadyExists(record.username.clone()))
        } else {
            self.users.insert(record.username.clone(), record);
            Ok(())
        }
    }

    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.users.get(username)
    }

    pub(crate) fn get_mut(&mut self, username: &str) -> Result<&mut CredentialRecord, StoreError> {
        self.users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    pub fn remove(&mut self, username: &str) -> Result<CredentialRecord, StoreError> {
        self.users
            .remove(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &CredentialRecord> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
