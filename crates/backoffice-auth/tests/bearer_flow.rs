//! End-to-end login, authorization, and logout against a real store.

use backoffice_accounts::{basic_tables, NewUser, Profiles, Sessions, Users};
use backoffice_auth::{AuthError, BearerAuth};
use backoffice_store::{PoolConfig, SqlitePool, Store, TableIdent, TableNamer};
use chrono::Duration;
use std::sync::Arc;

struct Fixture {
    users: Users<SqlitePool>,
    sessions: Sessions<SqlitePool>,
}

impl Fixture {
    fn open(dir: &tempfile::TempDir, ttl: Duration) -> Self {
        let pool = SqlitePool::open(&dir.path().join("test.db"), PoolConfig::default()).unwrap();
        let namer = TableNamer::prefixed("test");
        let store = Arc::new(Store::new(pool, basic_tables(&namer).unwrap()));

        let profiles = Profiles::new(Arc::clone(&store), TableIdent::new(namer.name("profiles")));
        let users = Users::new(Arc::clone(&store), TableIdent::new(namer.name("users")))
            .with_profiles(profiles);
        let sessions = Sessions::new(store, TableIdent::new(namer.name("sessions")), ttl);

        Self { users, sessions }
    }

    fn auth(&self) -> BearerAuth<Users<SqlitePool>, Sessions<SqlitePool>> {
        BearerAuth::new(self.users.clone(), self.sessions.clone())
    }
}

#[test]
fn test_login_authorize_logout_flow() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = Fixture::open(&dir, Duration::hours(1));

    // Sign up and log in.
    let user = fixture
        .users
        .create(NewUser {
            email: "bob@example.com".to_string(),
            password: "glow".to_string(),
        })
        .unwrap();

    let fetched = fixture.users.get_by_email("bob@example.com").unwrap();
    fetched.authenticate("glow").unwrap();

    let session = fixture.sessions.create(&fetched).unwrap();
    let header = format!("Bearer {}", session.bearer_token());

    // The minted credential authorizes requests.
    let auth = fixture.auth();
    auth.check_authorization(&header).unwrap();

    // A second login reuses the same session, so the credential stays
    // valid.
    let again = fixture.sessions.create(&fetched).unwrap();
    assert_eq!(again.token, session.token);
    auth.check_authorization(&header).unwrap();

    // Logout deletes the session and the credential stops working.
    fixture.sessions.delete(&user.public_id).unwrap();
    let err = auth.check_authorization(&header).unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound(_)));
}

#[test]
fn test_forged_and_expired_credentials_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = Fixture::open(&dir, Duration::seconds(-1));

    let user = fixture
        .users
        .create(NewUser {
            email: "eve@example.com".to_string(),
            password: "glow".to_string(),
        })
        .unwrap();
    let session = fixture.sessions.create(&user).unwrap();
    let auth = fixture.auth();

    // Wrong secret.
    let err = auth
        .check_authorization(&format!("Bearer {}:forged", user.public_id))
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenMismatch(_)));

    // Right secret, but the session is already past its expiry.
    let err = auth
        .check_authorization(&format!("Bearer {}", session.bearer_token()))
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired(_)));

    // The failed checks never deleted the session record.
    let still_there = fixture.sessions.get(&user.public_id).unwrap();
    assert_eq!(still_there.token, session.token);
}
