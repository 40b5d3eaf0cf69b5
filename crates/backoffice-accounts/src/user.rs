//! User records and password handling.

use crate::{AccountsError, AccountsResult, Profile};
use backoffice_store::{Record, StoreResult, TableConsumer, TableFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request shape for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

/// Request shape for updating a user's email.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub public_id: String,
    pub email: String,
}

/// Request shape for updating a user's password.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserPassword {
    pub public_id: String,
    pub password: String,
}

/// A stored user. The password is kept only as a bcrypt hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub public_id: String,
    pub private_id: String,
    pub email: String,
    pub hash: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl User {
    /// Mint a new user with fresh public/private identifiers and a hashed
    /// password.
    pub fn new(new_user: NewUser) -> AccountsResult<Self> {
        let hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)?;
        Ok(Self {
            public_id: Uuid::new_v4().to_string(),
            private_id: Uuid::new_v4().to_string(),
            email: new_user.email,
            hash,
            created_at: None,
            updated_at: None,
            profile: None,
        })
    }

    /// Verify the supplied password against the stored hash.
    pub fn authenticate(&self, password: &str) -> AccountsResult<()> {
        if bcrypt::verify(password, &self.hash)? {
            Ok(())
        } else {
            Err(AccountsError::InvalidCredentials(self.public_id.clone()))
        }
    }

    /// Replace the stored hash with one for the new password.
    pub fn change_password(&mut self, password: &str) -> AccountsResult<()> {
        self.hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        Ok(())
    }
}

impl TableFields for User {
    fn fields(&self) -> Record {
        Record::new()
            .with("public_id", self.public_id.as_str())
            .with("private_id", self.private_id.as_str())
            .with("email", self.email.as_str())
            .with("hash", self.hash.as_str())
    }
}

impl TableConsumer for User {
    fn with_fields(&mut self, record: &Record) -> StoreResult<()> {
        self.public_id = record.require_str("public_id")?.to_string();
        self.private_id = record.require_str("private_id")?.to_string();
        self.email = record.require_str("email")?.to_string();
        self.hash = record.require_str("hash")?.to_string();
        self.created_at = record.get("created_at").and_then(|v| v.as_timestamp());
        self.updated_at = record.get("updated_at").and_then(|v| v.as_timestamp());
        Ok(())
    }
}

impl TableFields for UpdateUser {
    fn fields(&self) -> Record {
        Record::new()
            .with("public_id", self.public_id.as_str())
            .with("email", self.email.as_str())
    }
}
