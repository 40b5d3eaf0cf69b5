//! User management.

use crate::{
    AccountsError, AccountsResult, NewUser, Profiles, UpdateUser, UpdateUserPassword, User,
};
use backoffice_store::{ConnectionProvider, Store, TableConsumer, TableIdent, Value};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Page envelope for the administrative user listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecords {
    pub total: i64,
    pub page: i64,
    #[serde(rename = "responsePerPage")]
    pub response_per_page: i64,
    pub records: Vec<User>,
}

/// Manages user records, optionally keeping a profile alongside each user.
pub struct Users<P: ConnectionProvider> {
    store: Arc<Store<P>>,
    table: TableIdent,
    profiles: Option<Profiles<P>>,
}

impl<P: ConnectionProvider> Clone for Users<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
            profiles: self.profiles.clone(),
        }
    }
}

impl<P: ConnectionProvider> Users<P> {
    pub fn new(store: Arc<Store<P>>, table: TableIdent) -> Self {
        Self {
            store,
            table,
            profiles: None,
        }
    }

    /// Attach a profiles manager; users created, fetched, and deleted
    /// through this manager then carry their profile along.
    pub fn with_profiles(mut self, profiles: Profiles<P>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Create a user from the supplied request, hashing its password.
    pub fn create(&self, new_user: NewUser) -> AccountsResult<User> {
        debug!(email = %new_user.email, "creating user");

        let mut user = User::new(new_user)?;
        self.store.save(&self.table, &user)?;

        if let Some(profiles) = &self.profiles {
            user.profile = Some(profiles.create(&user)?);
        }

        Ok(user)
    }

    /// Fetch a user by public id.
    pub fn get(&self, public_id: &str) -> AccountsResult<User> {
        let mut user = User::default();
        self.store
            .get(&self.table, &mut user, "public_id", &Value::from(public_id))?;

        if let Some(profiles) = &self.profiles {
            user.profile = Some(profiles.get_by_user(&user.public_id)?);
        }

        Ok(user)
    }

    /// Fetch a user by email.
    pub fn get_by_email(&self, email: &str) -> AccountsResult<User> {
        let mut user = User::default();
        self.store
            .get(&self.table, &mut user, "email", &Value::from(email))?;

        if let Some(profiles) = &self.profiles {
            user.profile = Some(profiles.get_by_user(&user.public_id)?);
        }

        Ok(user)
    }

    /// Paginated administrative listing.
    pub fn get_all(&self, page: i64, per_page: i64) -> AccountsResult<UserRecords> {
        let (records, total) =
            self.store
                .get_all_per_page(&self.table, "asc", "public_id", page, per_page)?;

        let mut users = Vec::with_capacity(records.len());
        for record in &records {
            let mut user = User::default();
            user.with_fields(record)?;
            users.push(user);
        }

        Ok(UserRecords {
            total,
            page,
            response_per_page: per_page,
            records: users,
        })
    }

    /// Update a user's email, addressed by public id.
    pub fn update(&self, update: UpdateUser) -> AccountsResult<()> {
        if update.public_id.is_empty() {
            return Err(AccountsError::Invalid("UpdateUser.public_id is empty".to_string()));
        }

        self.store.update(&self.table, &update, "public_id")?;
        Ok(())
    }

    /// Rehash and store a new password for the addressed user.
    pub fn update_password(&self, update: UpdateUserPassword) -> AccountsResult<()> {
        if update.public_id.is_empty() {
            return Err(AccountsError::Invalid(
                "UpdateUserPassword.public_id is empty".to_string(),
            ));
        }
        if update.password.is_empty() {
            return Err(AccountsError::Invalid(
                "UpdateUserPassword.password is empty".to_string(),
            ));
        }

        let mut user = self.get(&update.public_id)?;
        user.change_password(&update.password)?;
        self.store.update(&self.table, &user, "public_id")?;
        Ok(())
    }

    /// Remove a user, and its profile when a profiles manager is attached.
    pub fn delete(&self, public_id: &str) -> AccountsResult<()> {
        self.store
            .delete(&self.table, "public_id", &Value::from(public_id))?;

        if let Some(profiles) = &self.profiles {
            profiles.delete_by_user(public_id)?;
        }

        Ok(())
    }
}
