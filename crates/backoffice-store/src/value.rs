//! Typed values, records, and SQL literal encoding.

use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar value carried between domain objects and the engine.
///
/// The set is closed: every variant has a literal encoding, so encoding a
/// field can never fail at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Render this value as SQL literal text, quoted and escaped as needed.
    ///
    /// Floats are rendered with exactly two decimal places; any further
    /// precision is lost. Callers depend on this rendering.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format!("{v:.2}"),
            Value::Text(s) => quote(s),
            Value::Bytes(b) => quote(&String::from_utf8_lossy(b)),
            Value::Timestamp(t) => quote(&t.to_rfc3339()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Interpret this value as a UTC timestamp.
    ///
    /// The backend renders timestamps as text, so rows read back carry
    /// RFC 3339 strings; those parse here as well.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// An ordered mapping from field name to [`Value`].
///
/// Field ordering is deterministic (sorted by name), so the statement text
/// built from a record is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Record::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in deterministic order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fetch a required text field, for use by consumers.
    pub fn require_str(&self, name: &str) -> StoreResult<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::MissingField(name.to_string()))
    }

    /// Fetch a required timestamp field, for use by consumers.
    pub fn require_timestamp(&self, name: &str) -> StoreResult<DateTime<Utc>> {
        self.get(name)
            .and_then(Value::as_timestamp)
            .ok_or_else(|| StoreError::MissingField(name.to_string()))
    }
}

/// Producer direction: domain object to field mapping.
pub trait TableFields {
    fn fields(&self) -> Record;
}

/// Absorber direction: field mapping to domain object.
pub trait TableConsumer {
    fn with_fields(&mut self, record: &Record) -> StoreResult<()>;
}

impl TableFields for Record {
    fn fields(&self) -> Record {
        self.clone()
    }
}

impl TableConsumer for Record {
    fn with_fields(&mut self, record: &Record) -> StoreResult<()> {
        *self = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_int_literal() {
        assert_eq!(Value::Int(42).to_literal(), "42");
        assert_eq!(Value::Int(-7).to_literal(), "-7");
    }

    #[test]
    fn test_float_literal_is_two_decimal_places() {
        assert_eq!(Value::Float(1.0).to_literal(), "1.00");
        assert_eq!(Value::Float(2.5).to_literal(), "2.50");
        // Further precision is dropped by the fixed rendering.
        assert_eq!(Value::Float(3.14159).to_literal(), "3.14");
    }

    #[test]
    fn test_text_literal_escapes_quotes() {
        assert_eq!(Value::from("plain").to_literal(), "'plain'");
        assert_eq!(Value::from("o'brien").to_literal(), "'o''brien'");
    }

    #[test]
    fn test_bytes_literal_uses_string_decoding() {
        assert_eq!(Value::from(b"hello".as_slice()).to_literal(), "'hello'");
    }

    #[test]
    fn test_timestamp_literal_round_trips() {
        let t = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap();
        let value = Value::from(t);
        assert_eq!(value.to_literal(), format!("'{}'", t.to_rfc3339()));

        let text = Value::Text(t.to_rfc3339());
        assert_eq!(text.as_timestamp(), Some(t));
    }

    #[test]
    fn test_record_ordering_is_deterministic() {
        let record = Record::new()
            .with("zulu", 1i64)
            .with("alpha", 2i64)
            .with("mike", 3i64);
        assert_eq!(record.names(), vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn test_record_require_missing_field() {
        let record = Record::new();
        assert!(matches!(
            record.require_str("email"),
            Err(StoreError::MissingField(f)) if f == "email"
        ));
    }
}
