//! Accounts error types.

use backoffice_store::StoreError;
use thiserror::Error;

/// Accounts error type.
#[derive(Error, Debug)]
pub enum AccountsError {
    /// Persistence engine failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error("Password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// Supplied password did not match the stored hash
    #[error("Invalid credentials for user {0:?}")]
    InvalidCredentials(String),

    /// Malformed request shape
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl AccountsError {
    /// Whether this error is the engine's "no row matched" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountsError::Store(StoreError::NotFound(_)))
    }
}

/// Result type alias using AccountsError.
pub type AccountsResult<T> = Result<T, AccountsError>;
