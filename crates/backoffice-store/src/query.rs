//! Statement construction for the CRUD operation shapes.
//!
//! Pure functions from table identity, field names, and literal text to SQL
//! text. Values arrive here already encoded as literals.

use crate::TableIdent;

/// Ordering direction for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Normalize a caller-supplied ordering. Any case-insensitive spelling
    /// of descending (`dsc`, `desc`) maps to [`Order::Desc`]; everything
    /// else, including unrecognized input, defaults to [`Order::Asc`].
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "dsc" | "desc" => Order::Desc,
            _ => Order::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

pub fn count(table: &TableIdent) -> String {
    format!("SELECT count(*) FROM {table}")
}

pub fn select_all(table: &TableIdent, order_by: &str, order: Order) -> String {
    format!("SELECT * FROM {table} ORDER BY {order_by} {}", order.as_sql())
}

pub fn select_page(
    table: &TableIdent,
    order_by: &str,
    order: Order,
    limit: i64,
    offset: i64,
) -> String {
    format!(
        "SELECT * FROM {table} ORDER BY {order_by} {} LIMIT {limit} OFFSET {offset}",
        order.as_sql()
    )
}

pub fn select_one(table: &TableIdent, key: &str, literal: &str) -> String {
    format!("SELECT * FROM {table} WHERE {key}={literal}")
}

pub fn insert(table: &TableIdent, columns: &[&str], literals: &[String]) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        literals.join(", ")
    )
}

pub fn update(table: &TableIdent, sets: &[(&str, String)], key: &str, literal: &str) -> String {
    let assignments: Vec<String> = sets
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE {key}={literal}",
        assignments.join(",")
    )
}

pub fn delete(table: &TableIdent, key: &str, literal: &str) -> String {
    format!("DELETE FROM {table} WHERE {key}={literal}")
}
