//! Session lifecycle management.

use crate::{AccountsResult, Session, User, SESSION_UNIQUE_INDEX};
use backoffice_store::{ConnectionProvider, Store, TableConsumer, TableIdent, Value};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Session configuration consumed from outside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session time-to-live in seconds.
    pub ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: 24 * 60 * 60 }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs)
    }
}

/// Page envelope for the administrative session listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecords {
    pub total: i64,
    pub page: i64,
    #[serde(rename = "responsePerPage")]
    pub response_per_page: i64,
    pub records: Vec<Session>,
}

/// Manages session records for users, one logically active session per
/// user.
pub struct Sessions<P: ConnectionProvider> {
    store: Arc<Store<P>>,
    table: TableIdent,
    ttl: Duration,
}

impl<P: ConnectionProvider> Clone for Sessions<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
            ttl: self.ttl,
        }
    }
}

impl<P: ConnectionProvider> Sessions<P> {
    pub fn new(store: Arc<Store<P>>, table: TableIdent, ttl: Duration) -> Self {
        Self { store, table, ttl }
    }

    /// Create a session for the user, reusing a still-valid existing one.
    ///
    /// An existing session whose expiry is in the future is returned
    /// unchanged, so repeated logins are idempotent. A session whose expiry
    /// was never set or has passed is deleted before a fresh one is minted.
    ///
    /// The lookup, delete, and insert are separate statements with no
    /// locking; concurrent creates for one user can race. Callers needing
    /// a strict single-session guarantee must serialize logins themselves.
    pub fn create(&self, user: &User) -> AccountsResult<Session> {
        debug!(user_id = %user.public_id, "creating session");

        let now = Utc::now();
        let key = Value::from(user.public_id.as_str());

        let mut existing = Session::default();
        match self
            .store
            .get(&self.table, &mut existing, SESSION_UNIQUE_INDEX, &key)
        {
            Ok(()) => {
                if existing.has_expiry() && now < existing.expires {
                    return Ok(existing);
                }
                self.store.delete(&self.table, SESSION_UNIQUE_INDEX, &key)?;
            }
            Err(err) => {
                debug!(user_id = %user.public_id, error = %err, "no reusable session");
            }
        }

        let session = Session::new(&user.public_id, now + self.ttl);
        self.store.save(&self.table, &session)?;
        Ok(session)
    }

    /// Fetch the session for the given user.
    ///
    /// The session may already be expired; expiry is the caller's check.
    pub fn get(&self, user_id: &str) -> AccountsResult<Session> {
        let mut session = Session::default();
        self.store.get(
            &self.table,
            &mut session,
            SESSION_UNIQUE_INDEX,
            &Value::from(user_id),
        )?;
        Ok(session)
    }

    /// Remove the session for the given user.
    pub fn delete(&self, user_id: &str) -> AccountsResult<()> {
        self.store
            .delete(&self.table, SESSION_UNIQUE_INDEX, &Value::from(user_id))?;
        Ok(())
    }

    /// Paginated administrative listing.
    pub fn get_all(&self, page: i64, per_page: i64) -> AccountsResult<SessionRecords> {
        let (records, total) =
            self.store
                .get_all_per_page(&self.table, "asc", "public_id", page, per_page)?;

        let mut sessions = Vec::with_capacity(records.len());
        for record in &records {
            let mut session = Session::default();
            session.with_fields(record)?;
            sessions.push(session);
        }

        Ok(SessionRecords {
            total,
            page,
            response_per_page: per_page,
            records: sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{basic_tables, NewUser};
    use backoffice_store::{PoolConfig, SqlitePool, TableNamer};

    fn open_sessions(dir: &tempfile::TempDir, ttl: Duration) -> Sessions<SqlitePool> {
        let pool = SqlitePool::open(&dir.path().join("test.db"), PoolConfig::default()).unwrap();
        let store = Arc::new(Store::new(
            pool,
            basic_tables(&TableNamer::bare()).unwrap(),
        ));
        Sessions::new(store, TableIdent::new("sessions"), ttl)
    }

    fn user() -> User {
        User::new(NewUser {
            email: "bob@example.com".to_string(),
            password: "glow".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_create_is_idempotent_while_valid() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::hours(1));
        let user = user();

        let first = sessions.create(&user).unwrap();
        let second = sessions.create(&user).unwrap();

        assert_eq!(first.public_id, second.public_id);
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn test_create_replaces_expired_session() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::seconds(-1));
        let user = user();

        let stale = sessions.create(&user).unwrap();
        assert!(stale.expired());

        let fresh = open_sessions(&dir, Duration::hours(1)).create(&user).unwrap();
        assert_ne!(fresh.token, stale.token);
        assert_ne!(fresh.public_id, stale.public_id);
        assert!(!fresh.expired());
    }

    #[test]
    fn test_get_returns_even_expired_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::seconds(-1));
        let user = user();

        let created = sessions.create(&user).unwrap();
        let fetched = sessions.get(&user.public_id).unwrap();
        assert_eq!(fetched.token, created.token);
        assert!(fetched.expired());
    }

    #[test]
    fn test_get_missing_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::hours(1));
        let err = sessions.get("nobody").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::hours(1));
        let user = user();

        sessions.create(&user).unwrap();
        sessions.delete(&user.public_id).unwrap();
        assert!(sessions.get(&user.public_id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_all_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open_sessions(&dir, Duration::hours(1));

        for _ in 0..3 {
            sessions.create(&user()).unwrap();
        }

        let listing = sessions.get_all(1, 2).unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.page, 1);
        assert_eq!(listing.response_per_page, 2);
        assert_eq!(listing.records.len(), 2);
    }

    #[test]
    fn test_session_config_ttl() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl(), Duration::hours(24));
    }
}
