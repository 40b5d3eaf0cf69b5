//! Table migrations for the backoffice tables.

use backoffice_store::{FieldMigration, IndexMigration, StoreResult, TableMigration, TableNamer};

/// The migrations for the profiles, sessions, and users tables.
///
/// Table names pass through the supplied namer so test and production
/// deployments can keep distinct tables in one database.
pub fn basic_tables(names: &TableNamer) -> StoreResult<Vec<TableMigration>> {
    let profiles = TableMigration::new(
        names.name("profiles"),
        true,
        vec![
            FieldMigration::new("user_id", "VARCHAR(255)").not_null(),
            FieldMigration::new("address", "TEXT").not_null(),
            FieldMigration::new("public_id", "VARCHAR(255)")
                .primary_key()
                .not_null(),
            FieldMigration::new("first_name", "VARCHAR(255)").not_null(),
            FieldMigration::new("last_name", "VARCHAR(255)").not_null(),
        ],
        vec![IndexMigration::new("user_id", "user_id")],
    )?;

    let sessions = TableMigration::new(
        names.name("sessions"),
        true,
        vec![
            FieldMigration::new("user_id", "VARCHAR(255)").not_null(),
            FieldMigration::new("token", "VARCHAR(255)").not_null(),
            FieldMigration::new("public_id", "VARCHAR(255)")
                .primary_key()
                .not_null(),
            FieldMigration::new("expires", "TIMESTAMP").not_null(),
        ],
        vec![IndexMigration::new("user_id", "user_id")],
    )?;

    let users = TableMigration::new(
        names.name("users"),
        true,
        vec![
            FieldMigration::new("email", "VARCHAR(255)").not_null(),
            FieldMigration::new("public_id", "VARCHAR(255)")
                .primary_key()
                .not_null(),
            FieldMigration::new("private_id", "VARCHAR(255)").not_null(),
            FieldMigration::new("hash", "VARCHAR(255)").not_null(),
        ],
        vec![],
    )?;

    Ok(vec![profiles, sessions, users])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tables() {
        let tables = basic_tables(&TableNamer::bare()).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.table_name()).collect();
        assert_eq!(names, vec!["profiles", "sessions", "users"]);
    }

    #[test]
    fn test_basic_tables_with_prefix() {
        let tables = basic_tables(&TableNamer::prefixed("test")).unwrap();
        assert_eq!(tables[0].table_name(), "test_profiles");
        assert!(tables[1]
            .render()
            .contains("CREATE TABLE IF NOT EXISTS test_sessions"));
    }
}
