//! Authentication error types.
//!
//! Every variant is terminal and non-retryable; callers at the HTTP
//! boundary map each onto an unauthorized outcome.

use backoffice_accounts::AccountsError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The authorization value did not split into scheme and token
    #[error("Malformed authorization: expected `<scheme> <token>`")]
    MalformedAuthorization,

    /// The scheme was not `Bearer` (exact, case-sensitive)
    #[error("Unsupported authorization scheme {0:?}: only `Bearer` is supported")]
    UnsupportedScheme(String),

    /// The token did not split into user id and session secret
    #[error("Malformed bearer token: expected `<user-id>:<secret>`")]
    MalformedToken,

    /// No user exists under the token's user id
    #[error("Unknown user {0:?}")]
    UnknownUser(String),

    /// The user has no session record
    #[error("No session found for user {0:?}")]
    SessionNotFound(String),

    /// The presented secret did not match the stored one
    #[error("Session token mismatch for user {0:?}")]
    TokenMismatch(String),

    /// The session's expiry has passed
    #[error("Session for user {0:?} has expired")]
    SessionExpired(String),

    /// A lookup failed for a reason other than absence
    #[error(transparent)]
    Accounts(#[from] AccountsError),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
