//! Declarative table migrations and schema rendering.
//!
//! A [`TableMigration`] is constructed once at process start from static
//! configuration, validated eagerly, and consumed by the engine's one-time
//! migration step.

use crate::{StoreError, StoreResult};
use std::collections::HashSet;
use std::fmt;

/// Opaque handle naming a storage table. Equality is by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent(String);

impl TableIdent {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableIdent {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TableIdent {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Maps base table names to environment-specific names (for example a
/// `test` prefix), so the same definitions serve every deployment.
#[derive(Debug, Clone)]
pub struct TableNamer {
    prefix: String,
    separator: String,
}

impl TableNamer {
    /// A namer that applies no prefix.
    pub fn bare() -> Self {
        Self {
            prefix: String::new(),
            separator: String::new(),
        }
    }

    /// A namer producing `<prefix>_<base>` names.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "_".to_string(),
        }
    }

    pub fn name(&self, base: &str) -> String {
        if self.prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}{}{}", self.prefix, self.separator, base)
        }
    }
}

/// One column of a table migration.
#[derive(Debug, Clone)]
pub struct FieldMigration {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

impl FieldMigration {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn render(&self) -> String {
        let mut out = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        out
    }
}

/// A secondary index over one field. No uniqueness is implied.
#[derive(Debug, Clone)]
pub struct IndexMigration {
    pub name: String,
    pub field: String,
}

impl IndexMigration {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
        }
    }
}

/// Declarative schema description for one table.
///
/// Validation happens here, at construction: exactly one primary-key field
/// and unique field names. Rendering never fails afterwards.
#[derive(Debug, Clone)]
pub struct TableMigration {
    table: String,
    timestamped: bool,
    fields: Vec<FieldMigration>,
    indexes: Vec<IndexMigration>,
}

impl TableMigration {
    pub fn new(
        table: impl Into<String>,
        timestamped: bool,
        fields: Vec<FieldMigration>,
        indexes: Vec<IndexMigration>,
    ) -> StoreResult<Self> {
        let table = table.into();

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(StoreError::Schema {
                    table,
                    reason: format!("duplicate field {:?}", field.name),
                });
            }
        }

        let primary_keys = fields.iter().filter(|f| f.primary_key).count();
        if primary_keys != 1 {
            return Err(StoreError::Schema {
                table,
                reason: format!("expected exactly one primary key field, found {primary_keys}"),
            });
        }

        Ok(Self {
            table,
            timestamped,
            fields,
            indexes,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn ident(&self) -> TableIdent {
        TableIdent::new(&self.table)
    }

    /// Render the schema-creation batch: one `CREATE TABLE IF NOT EXISTS`
    /// statement with fields in declared order, timestamp columns when
    /// `timestamped`, then one `CREATE INDEX IF NOT EXISTS` per index.
    pub fn render(&self) -> String {
        let mut columns: Vec<String> = self.fields.iter().map(FieldMigration::render).collect();
        if self.timestamped {
            columns.push("created_at TIMESTAMP".to_string());
            columns.push("updated_at TIMESTAMP".to_string());
        }

        let mut out = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n",
            self.table,
            columns.join(",\n    ")
        );

        for index in &self.indexes {
            out.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({});\n",
                self.table, index.name, self.table, index.field
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<FieldMigration> {
        vec![
            FieldMigration::new("user_id", "VARCHAR(255)").not_null(),
            FieldMigration::new("public_id", "VARCHAR(255)")
                .primary_key()
                .not_null(),
        ]
    }

    #[test]
    fn test_render_table_with_timestamps_and_index() {
        let migration = TableMigration::new(
            "sessions",
            true,
            sample_fields(),
            vec![IndexMigration::new("user_id", "user_id")],
        )
        .unwrap();

        let rendered = migration.render();
        assert!(rendered.starts_with("CREATE TABLE IF NOT EXISTS sessions ("));
        assert!(rendered.contains("user_id VARCHAR(255) NOT NULL"));
        assert!(rendered.contains("public_id VARCHAR(255) PRIMARY KEY NOT NULL"));
        assert!(rendered.contains("created_at TIMESTAMP"));
        assert!(rendered.contains("updated_at TIMESTAMP"));
        assert!(rendered.contains("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);"));
    }

    #[test]
    fn test_render_without_timestamps() {
        let migration = TableMigration::new("plain", false, sample_fields(), vec![]).unwrap();
        let rendered = migration.render();
        assert!(!rendered.contains("created_at"));
        assert!(!rendered.contains("CREATE INDEX"));
    }

    #[test]
    fn test_missing_primary_key_is_rejected() {
        let fields = vec![FieldMigration::new("email", "VARCHAR(255)").not_null()];
        let err = TableMigration::new("users", true, fields, vec![]).unwrap_err();
        assert!(matches!(err, StoreError::Schema { table, .. } if table == "users"));
    }

    #[test]
    fn test_multiple_primary_keys_are_rejected() {
        let fields = vec![
            FieldMigration::new("a", "TEXT").primary_key(),
            FieldMigration::new("b", "TEXT").primary_key(),
        ];
        assert!(TableMigration::new("users", false, fields, vec![]).is_err());
    }

    #[test]
    fn test_duplicate_field_names_are_rejected() {
        let fields = vec![
            FieldMigration::new("email", "TEXT").primary_key(),
            FieldMigration::new("email", "TEXT"),
        ];
        assert!(TableMigration::new("users", false, fields, vec![]).is_err());
    }

    #[test]
    fn test_namer() {
        assert_eq!(TableNamer::bare().name("users"), "users");
        assert_eq!(TableNamer::prefixed("test").name("users"), "test_users");
    }
}
