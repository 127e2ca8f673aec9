use thiserror::Error;

/// Errors raised by the credential hashing core.
///
/// A password that simply does not match is not an error; `verify` reports it
/// as `Ok(false)`.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A required primitive (randomness source, PRF) is unusable. Deployment
    /// defect, never caused by user input.
    #[error("cryptographic environment unavailable: {0}")]
    Environment(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed base64: {0}")]
    Decode(String),
}

impl CredentialError {
    pub(crate) fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user '{0}' already exists")]
    UserAlreadyExists(String),
    #[error("user '{0}' not found")]
    UserNotFound(String),
}
