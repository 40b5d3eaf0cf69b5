//! The persistence engine: one-time migration plus the CRUD operations.

use crate::query::{self, Order};
use crate::{
    ConnectionProvider, Record, StoreError, StoreResult, TableConsumer, TableFields, TableIdent,
    TableMigration, Value,
};
use chrono::Utc;
use rusqlite::types::ValueRef;
use rusqlite::Row;
use std::sync::Mutex;
use tracing::{debug, info};

/// Generic persistence engine bound to a set of table migrations.
///
/// Each operation acquires its own connection from the provider, runs the
/// one-time migration step first, executes a single statement, and releases
/// the connection on every exit path. Writes are wrapped in a
/// single-statement transaction; there is no cross-statement transactional
/// scope, no retry, and no timeout beyond the provider's own.
pub struct Store<P: ConnectionProvider> {
    provider: P,
    tables: Vec<TableMigration>,
    migrated: Mutex<bool>,
}

impl<P: ConnectionProvider> Store<P> {
    pub fn new(provider: P, tables: Vec<TableMigration>) -> Self {
        Self {
            provider,
            tables,
            migrated: Mutex::new(false),
        }
    }

    /// Run the schema migrations if they have not run yet.
    ///
    /// The latch is held for the duration of the run, so concurrent first
    /// callers serialize and the migration executes exactly once. A failed
    /// run leaves the latch unset and the next caller retries.
    fn migrate(&self) -> StoreResult<()> {
        let mut migrated = self
            .migrated
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *migrated {
            return Ok(());
        }

        let conn = self.provider.acquire()?;
        for table in &self.tables {
            info!(table = table.table_name(), "applying schema migration");
            let batch = table.render();
            conn.execute_batch(&batch).map_err(|e| StoreError::Query {
                query: batch.clone(),
                source: e,
            })?;
        }

        *migrated = true;
        Ok(())
    }

    /// Insert the supplied fields, stamping `created_at`/`updated_at` with
    /// the current UTC time.
    pub fn save(&self, table: &TableIdent, fields: &impl TableFields) -> StoreResult<()> {
        self.migrate()?;

        let mut record = fields.fields();
        let now = Utc::now();
        record.set("created_at", now);
        record.set("updated_at", now);

        let columns = record.names();
        let literals: Vec<String> = record.iter().map(|(_, v)| v.to_literal()).collect();
        let query = query::insert(table, &columns, &literals);
        debug!(table = table.as_str(), %query, "executing insert");

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        tx.execute(&query, []).map_err(|e| StoreError::Query {
            query: query.clone(),
            source: e,
        })?;
        tx.commit()?;
        Ok(())
    }

    /// Update the row addressed by `index_key`, stamping `updated_at`.
    ///
    /// The index key must be present in the supplied field mapping; it is
    /// removed from the SET clause and used to scope the statement.
    pub fn update(
        &self,
        table: &TableIdent,
        fields: &impl TableFields,
        index_key: &str,
    ) -> StoreResult<()> {
        self.migrate()?;

        let mut record = fields.fields();
        record.set("updated_at", Utc::now());

        let Some(index_value) = record.get(index_key).cloned() else {
            return Err(StoreError::IndexMissing {
                table: table.as_str().to_string(),
                key: index_key.to_string(),
            });
        };
        record.remove(index_key);

        let sets: Vec<(&str, String)> = record.iter().map(|(n, v)| (n, v.to_literal())).collect();
        let query = query::update(table, &sets, index_key, &index_value.to_literal());
        debug!(table = table.as_str(), %query, "executing update");

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        tx.execute(&query, []).map_err(|e| StoreError::Query {
            query: query.clone(),
            source: e,
        })?;
        tx.commit()?;
        Ok(())
    }

    /// Fetch the single row where `index_key` equals `index_value` and hand
    /// it to the consumer. Fails with [`StoreError::NotFound`] when no row
    /// matches.
    pub fn get(
        &self,
        table: &TableIdent,
        consumer: &mut impl TableConsumer,
        index_key: &str,
        index_value: &Value,
    ) -> StoreResult<()> {
        self.migrate()?;

        let conn = self.provider.acquire()?;
        let literal = index_value.to_literal();
        let query = query::select_one(table, index_key, &literal);
        debug!(table = table.as_str(), %query, "executing select");

        let mut stmt = conn.prepare(&query).map_err(|e| StoreError::Query {
            query: query.clone(),
            source: e,
        })?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        match stmt.query_row([], |row| row_to_record(&columns, row)) {
            Ok(record) => consumer.with_fields(&record),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound(format!(
                "no row in {table} where {index_key}={literal}"
            ))),
            Err(e) => Err(StoreError::Query { query, source: e }),
        }
    }

    /// Fetch every row, ordered by `order_by` in the normalized `order`
    /// direction.
    pub fn get_all(
        &self,
        table: &TableIdent,
        order: &str,
        order_by: &str,
    ) -> StoreResult<Vec<Record>> {
        self.migrate()?;

        let conn = self.provider.acquire()?;
        let query = query::select_all(table, order_by, Order::parse(order));
        debug!(table = table.as_str(), %query, "executing select all");
        run_listing(&conn, &query)
    }

    /// Fetch one page of rows along with the true total record count.
    ///
    /// With both `page <= 0` and `per_page <= 0` this delegates to
    /// [`get_all`](Store::get_all) and reports its length as the total.
    /// Otherwise the result window is `wanted = per_page`, `start = 0` for
    /// the first page, and `wanted = per_page * page`,
    /// `start = wanted / 2 + 1` past it. A `start` beyond the total yields
    /// an empty result with the true total, not an error.
    pub fn get_all_per_page(
        &self,
        table: &TableIdent,
        order: &str,
        order_by: &str,
        page: i64,
        per_page: i64,
    ) -> StoreResult<(Vec<Record>, i64)> {
        self.migrate()?;

        if page <= 0 && per_page <= 0 {
            let records = self.get_all(table, order, order_by)?;
            let total = records.len() as i64;
            return Ok((records, total));
        }

        let total = self.count(table)?;

        let (wanted, start) = if page <= 1 && per_page > 0 {
            (per_page, 0)
        } else {
            let wanted = per_page * page;
            let mut start = wanted / 2;
            if page > 1 {
                start += 1;
            }
            (wanted, start)
        };

        debug!(
            table = table.as_str(),
            page,
            per_page,
            wanted,
            start,
            total,
            "paging listing"
        );

        if start > total {
            return Ok((Vec::new(), total));
        }

        let conn = self.provider.acquire()?;
        let query = query::select_page(table, order_by, Order::parse(order), wanted, start);
        debug!(table = table.as_str(), %query, "executing paged select");
        let records = run_listing(&conn, &query)?;
        Ok((records, total))
    }

    /// Delete the row addressed by `index_key` = `index_value`.
    pub fn delete(
        &self,
        table: &TableIdent,
        index_key: &str,
        index_value: &Value,
    ) -> StoreResult<()> {
        self.migrate()?;

        let query = query::delete(table, index_key, &index_value.to_literal());
        debug!(table = table.as_str(), %query, "executing delete");

        let mut conn = self.provider.acquire()?;
        let tx = conn.transaction()?;
        tx.execute(&query, []).map_err(|e| StoreError::Query {
            query: query.clone(),
            source: e,
        })?;
        tx.commit()?;
        Ok(())
    }

    /// Total number of rows in the table.
    pub fn count(&self, table: &TableIdent) -> StoreResult<i64> {
        self.migrate()?;

        let conn = self.provider.acquire()?;
        let query = query::count(table);
        debug!(table = table.as_str(), %query, "executing count");

        conn.query_row(&query, [], |row| row.get(0))
            .map_err(|e| StoreError::Query { query, source: e })
    }
}

fn run_listing(conn: &rusqlite::Connection, query: &str) -> StoreResult<Vec<Record>> {
    let mut stmt = conn.prepare(query).map_err(|e| StoreError::Query {
        query: query.to_string(),
        source: e,
    })?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let rows = stmt
        .query_map([], |row| row_to_record(&columns, row))
        .map_err(|e| StoreError::Query {
            query: query.to_string(),
            source: e,
        })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(|e| StoreError::Query {
            query: query.to_string(),
            source: e,
        })?);
    }
    Ok(records)
}

/// Build a [`Record`] from a row. Byte-sequence columns are normalized to
/// text; SQL NULL columns are omitted from the record.
fn row_to_record(columns: &[String], row: &Row<'_>) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, name) in columns.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => None,
            ValueRef::Integer(v) => Some(Value::Int(v)),
            ValueRef::Real(v) => Some(Value::Float(v)),
            ValueRef::Text(v) => Some(Value::Text(String::from_utf8_lossy(v).into_owned())),
            ValueRef::Blob(v) => Some(Value::Text(String::from_utf8_lossy(v).into_owned())),
        };
        if let Some(value) = value {
            record.set(name.clone(), value);
        }
    }
    Ok(record)
}
