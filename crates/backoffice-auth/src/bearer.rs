//! The bearer authorization decision.

use crate::{AuthError, AuthResult};
use backoffice_accounts::{AccountsResult, Session, Sessions, User, Users};
use backoffice_store::ConnectionProvider;
use tracing::debug;

/// The only accepted authorization scheme, matched exactly.
pub const BEARER_SCHEME: &str = "Bearer";

/// Split an `Authorization` value into scheme and token on the first
/// space. Both halves are trimmed; emptiness is the token parser's
/// concern.
pub fn parse_authorization(value: &str) -> AuthResult<(&str, &str)> {
    let mut parts = value.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) => Ok((scheme.trim(), token.trim())),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

/// Split a bearer token into `<user-id>:<secret>`.
pub fn parse_bearer_token(token: &str) -> AuthResult<(&str, &str)> {
    let mut parts = token.splitn(2, ':');
    match (parts.next(), parts.next()) {
        (Some(user_id), Some(secret)) if !user_id.is_empty() && !secret.is_empty() => {
            Ok((user_id, secret))
        }
        _ => Err(AuthError::MalformedToken),
    }
}

/// A user lookup capability.
pub trait LookupUsers {
    fn user_by_id(&self, public_id: &str) -> AccountsResult<User>;
}

/// A session lookup capability.
pub trait LookupSessions {
    fn session_for_user(&self, user_id: &str) -> AccountsResult<Session>;
}

impl<P: ConnectionProvider> LookupUsers for Users<P> {
    fn user_by_id(&self, public_id: &str) -> AccountsResult<User> {
        self.get(public_id)
    }
}

impl<P: ConnectionProvider> LookupSessions for Sessions<P> {
    fn session_for_user(&self, user_id: &str) -> AccountsResult<Session> {
        self.get(user_id)
    }
}

/// The bearer authorization check, composed from a user lookup and a
/// session lookup.
pub struct BearerAuth<U, S> {
    users: U,
    sessions: S,
}

impl<U: LookupUsers, S: LookupSessions> BearerAuth<U, S> {
    pub fn new(users: U, sessions: S) -> Self {
        Self { users, sessions }
    }

    /// Decide whether the request carrying this `Authorization` value is
    /// authorized.
    ///
    /// Succeeds with no value; callers re-fetch the user or session
    /// themselves when they need the data. Nothing is mutated here.
    pub fn check_authorization(&self, authorization: &str) -> AuthResult<()> {
        debug!(%authorization, "checking authorization");

        let (scheme, token) = parse_authorization(authorization)?;
        if scheme != BEARER_SCHEME {
            return Err(AuthError::UnsupportedScheme(scheme.to_string()));
        }

        let (user_id, secret) = parse_bearer_token(token)?;

        self.users.user_by_id(user_id).map_err(|err| {
            if err.is_not_found() {
                AuthError::UnknownUser(user_id.to_string())
            } else {
                AuthError::Accounts(err)
            }
        })?;

        let session = self.sessions.session_for_user(user_id).map_err(|err| {
            if err.is_not_found() {
                AuthError::SessionNotFound(user_id.to_string())
            } else {
                AuthError::Accounts(err)
            }
        })?;

        if !session.validate_token(secret) {
            return Err(AuthError::TokenMismatch(user_id.to_string()));
        }

        if session.expired() {
            return Err(AuthError::SessionExpired(user_id.to_string()));
        }

        Ok(())
    }
}
