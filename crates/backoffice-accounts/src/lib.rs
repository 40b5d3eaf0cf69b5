//! Domain records and managers for the backoffice.
//!
//! This crate provides:
//! - The user, profile, and session record types
//! - Table migrations for the three backing tables
//! - Managers driving each record's lifecycle through the persistence
//!   engine
//!
//! Each manager owns a reference to a [`backoffice_store::Store`] bound to
//! its own table; none of them touches SQL directly.

mod error;
mod profile;
mod profiles;
mod session;
mod sessions;
mod tables;
mod user;
mod users;

pub use error::{AccountsError, AccountsResult};
pub use profile::Profile;
pub use profiles::Profiles;
pub use session::{Session, SESSION_UNIQUE_INDEX};
pub use sessions::{SessionConfig, SessionRecords, Sessions};
pub use tables::basic_tables;
pub use user::{NewUser, UpdateUser, UpdateUserPassword, User};
pub use users::{UserRecords, Users};
