//! Bearer authentication for the backoffice.
//!
//! This crate provides:
//! - Parsing of `Authorization` header values and bearer tokens
//! - The pass/fail authorization decision over a user lookup and a
//!   session lookup
//!
//! The check is stateless: nothing is mutated, and an expired or invalid
//! session is reported, never deleted. Deletion happens only through
//! explicit logout or through session creation's stale-session cleanup.

mod bearer;
mod error;

pub use bearer::{
    parse_authorization, parse_bearer_token, BearerAuth, LookupSessions, LookupUsers,
    BEARER_SCHEME,
};
pub use error::{AuthError, AuthResult};
