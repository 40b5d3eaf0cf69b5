//! Store error types.

use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error outside of statement execution
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection acquisition error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed migration definition, caught at construction
    #[error("Schema error for table {table:?}: {reason}")]
    Schema { table: String, reason: String },

    /// Statement execution failure, carries the offending statement text
    #[error("Query failed: {query}: {source}")]
    Query {
        query: String,
        source: rusqlite::Error,
    },

    /// No row matched a single-row lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// An update's index key was absent from the supplied field mapping
    #[error("Index key {key:?} not found in fields for table {table}")]
    IndexMissing { table: String, key: String },

    /// A consumer could not absorb a row
    #[error("Record is missing field {0:?}")]
    MissingField(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
