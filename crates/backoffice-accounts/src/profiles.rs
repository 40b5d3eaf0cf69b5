//! Profile management.

use crate::{AccountsResult, Profile, User};
use backoffice_store::{ConnectionProvider, Store, TableIdent, Value};
use std::sync::Arc;
use tracing::debug;

/// Manages profile records, looked up by the owning user's id.
pub struct Profiles<P: ConnectionProvider> {
    store: Arc<Store<P>>,
    table: TableIdent,
}

impl<P: ConnectionProvider> Clone for Profiles<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
        }
    }
}

impl<P: ConnectionProvider> Profiles<P> {
    pub fn new(store: Arc<Store<P>>, table: TableIdent) -> Self {
        Self { store, table }
    }

    /// Create an empty profile for the given user.
    pub fn create(&self, user: &User) -> AccountsResult<Profile> {
        debug!(user_id = %user.public_id, "creating profile");
        let profile = Profile::for_user(user);
        self.store.save(&self.table, &profile)?;
        Ok(profile)
    }

    /// Fetch the profile owned by the given user.
    pub fn get_by_user(&self, user_id: &str) -> AccountsResult<Profile> {
        let mut profile = Profile::default();
        self.store
            .get(&self.table, &mut profile, "user_id", &Value::from(user_id))?;
        Ok(profile)
    }

    /// Persist changes to a profile, addressed by its public id.
    pub fn update(&self, profile: &Profile) -> AccountsResult<()> {
        self.store.update(&self.table, profile, "public_id")?;
        Ok(())
    }

    /// Remove the profile owned by the given user.
    pub fn delete_by_user(&self, user_id: &str) -> AccountsResult<()> {
        self.store
            .delete(&self.table, "user_id", &Value::from(user_id))?;
        Ok(())
    }
}
