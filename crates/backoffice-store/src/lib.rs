//! Generic relational persistence engine for the backoffice.
//!
//! This crate provides:
//! - Declarative table migrations rendered to schema statements
//! - A closed tagged value type with SQL literal encoding
//! - A query builder for the CRUD statement shapes
//! - Connection pooling with WAL mode
//! - The persistence engine tying the above together
//!
//! # Architecture
//!
//! Every operation on [`Store`] acquires a connection from its
//! [`ConnectionProvider`], runs the one-time schema migration if it has not
//! run yet, executes exactly one statement, and releases the connection on
//! every exit path. Domain crates talk to the engine through the
//! [`TableFields`] / [`TableConsumer`] traits and never touch SQL directly.
//!
//! ```ignore
//! let pool = SqlitePool::open(&path, PoolConfig::default())?;
//! let store = Store::new(pool, tables);
//! store.save(&users_table, &new_user)?;
//! ```

mod engine;
mod error;
mod pool;
pub mod query;
mod schema;
mod value;

pub use engine::Store;
pub use error::{StoreError, StoreResult};
pub use pool::{ConnectionProvider, PoolConfig, PoolState, SqlitePool};
pub use query::Order;
pub use schema::{FieldMigration, IndexMigration, TableIdent, TableMigration, TableNamer};
pub use value::{Record, TableConsumer, TableFields, Value};
