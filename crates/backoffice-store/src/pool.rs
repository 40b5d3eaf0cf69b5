//! Connection acquisition: the provider boundary and the pooled SQLite
//! implementation.
//!
//! The engine acquires one connection per operation and releases it on every
//! exit path. Pooling discipline beyond "acquire, use, release" belongs to
//! the provider, not the engine.

use crate::{StoreError, StoreResult};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::ops::DerefMut;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Produce a live connection on demand.
pub trait ConnectionProvider {
    type Conn: DerefMut<Target = Connection>;

    fn acquire(&self) -> StoreResult<Self::Conn>;
}

/// Configuration for the SQLite pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum connections in the pool.
    pub max_size: u32,
    /// Minimum idle connections to maintain.
    pub min_idle: Option<u32>,
    /// Connection acquisition timeout.
    pub connection_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone)]
pub struct PoolState {
    /// Total connections (active + idle).
    pub connections: u32,
    /// Currently idle connections.
    pub idle_connections: u32,
}

/// Thread-safe SQLite connection pool.
///
/// Uses WAL mode so readers are not blocked by the serialized writer.
#[derive(Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    path: String,
}

impl SqlitePool {
    /// Create a pool at the given path, creating the database file and its
    /// parent directory if needed.
    pub fn open(path: &Path, config: PoolConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Connection(e.to_string()))?;
        }

        let path_str = path.to_string_lossy().to_string();

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
                PRAGMA cache_size = -64000;
                PRAGMA temp_store = MEMORY;
                PRAGMA busy_timeout = 5000;
            ",
            )?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!(path = %path_str, max_size = config.max_size, "SQLite pool created");

        Ok(Self {
            pool,
            path: path_str,
        })
    }

    /// Get pool statistics for monitoring.
    pub fn state(&self) -> PoolState {
        let state = self.pool.state();
        PoolState {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check pool health by acquiring and releasing a connection.
    pub fn health_check(&self) -> StoreResult<()> {
        let conn = self.acquire()?;
        conn.execute_batch("SELECT 1")?;
        debug!("SQLite pool health check passed");
        Ok(())
    }
}

impl ConnectionProvider for SqlitePool {
    type Conn = PooledConnection<SqliteConnectionManager>;

    fn acquire(&self) -> StoreResult<Self::Conn> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}
