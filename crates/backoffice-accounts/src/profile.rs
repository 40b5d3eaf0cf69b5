//! Profile records.

use crate::User;
use backoffice_store::{Record, StoreResult, TableConsumer, TableFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's profile. Created empty alongside the user and filled in later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub public_id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// An empty profile attached to the given user.
    pub fn for_user(user: &User) -> Self {
        Self {
            public_id: Uuid::new_v4().to_string(),
            user_id: user.public_id.clone(),
            ..Self::default()
        }
    }
}

impl TableFields for Profile {
    fn fields(&self) -> Record {
        Record::new()
            .with("public_id", self.public_id.as_str())
            .with("user_id", self.user_id.as_str())
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("address", self.address.as_str())
    }
}

impl TableConsumer for Profile {
    fn with_fields(&mut self, record: &Record) -> StoreResult<()> {
        self.public_id = record.require_str("public_id")?.to_string();
        self.user_id = record.require_str("user_id")?.to_string();
        self.first_name = record.require_str("first_name")?.to_string();
        self.last_name = record.require_str("last_name")?.to_string();
        self.address = record.require_str("address")?.to_string();
        self.created_at = record.get("created_at").and_then(|v| v.as_timestamp());
        self.updated_at = record.get("updated_at").and_then(|v| v.as_timestamp());
        Ok(())
    }
}
