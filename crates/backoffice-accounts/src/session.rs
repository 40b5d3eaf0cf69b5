//! Session records and secret tokens.

use backoffice_store::{Record, StoreResult, TableConsumer, TableFields};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The sessions table is looked up by user id. Uniqueness of one session
/// per user is application-level convention, not a database constraint.
pub const SESSION_UNIQUE_INDEX: &str = "user_id";

const TOKEN_LEN: usize = 40;

/// A login session for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub public_id: String,
    pub token: String,
    pub expires: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            public_id: String::new(),
            token: String::new(),
            expires: DateTime::<Utc>::UNIX_EPOCH,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Session {
    /// Mint a session for the given user with a fresh public id and secret
    /// token.
    pub fn new(user_id: &str, expires: DateTime<Utc>) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        Self {
            user_id: user_id.to_string(),
            public_id: Uuid::new_v4().to_string(),
            token,
            expires,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether an expiry was ever set on this session.
    pub fn has_expiry(&self) -> bool {
        self.expires.timestamp() != 0
    }

    /// Whether the session's expiry has passed.
    pub fn expired(&self) -> bool {
        Utc::now() > self.expires
    }

    /// Compare the stored secret against a presented one.
    pub fn validate_token(&self, token: &str) -> bool {
        self.token == token
    }

    /// The bearer credential for this session: `<user-id>:<secret>`.
    pub fn bearer_token(&self) -> String {
        format!("{}:{}", self.user_id, self.token)
    }
}

impl TableFields for Session {
    fn fields(&self) -> Record {
        Record::new()
            .with("user_id", self.user_id.as_str())
            .with("public_id", self.public_id.as_str())
            .with("token", self.token.as_str())
            .with("expires", self.expires)
    }
}

impl TableConsumer for Session {
    fn with_fields(&mut self, record: &Record) -> StoreResult<()> {
        self.user_id = record.require_str("user_id")?.to_string();
        self.public_id = record.require_str("public_id")?.to_string();
        self.token = record.require_str("token")?.to_string();
        self.expires = record.require_timestamp("expires")?;
        self.created_at = record.get("created_at").and_then(|v| v.as_timestamp());
        self.updated_at = record.get("updated_at").and_then(|v| v.as_timestamp());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_session() {
        let expires = Utc::now() + Duration::hours(1);
        let session = Session::new("user-1", expires);

        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.token.len(), TOKEN_LEN);
        assert!(session.has_expiry());
        assert!(!session.expired());
        assert_eq!(
            session.bearer_token(),
            format!("user-1:{}", session.token)
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        let expires = Utc::now() + Duration::hours(1);
        let a = Session::new("user-1", expires);
        let b = Session::new("user-1", expires);
        assert_ne!(a.token, b.token);
        assert_ne!(a.public_id, b.public_id);
    }

    #[test]
    fn test_validate_token() {
        let session = Session::new("user-1", Utc::now() + Duration::hours(1));
        assert!(session.validate_token(&session.token.clone()));
        assert!(!session.validate_token("forged"));
    }

    #[test]
    fn test_expired() {
        let session = Session::new("user-1", Utc::now() - Duration::seconds(1));
        assert!(session.expired());
    }

    #[test]
    fn test_default_has_no_expiry() {
        assert!(!Session::default().has_expiry());
    }

    #[test]
    fn test_field_round_trip() {
        let session = Session::new("user-1", Utc::now() + Duration::hours(1));
        let mut consumed = Session::default();
        consumed.with_fields(&session.fields()).unwrap();
        assert_eq!(consumed.user_id, session.user_id);
        assert_eq!(consumed.public_id, session.public_id);
        assert_eq!(consumed.token, session.token);
        assert_eq!(consumed.expires, session.expires);
    }
}
