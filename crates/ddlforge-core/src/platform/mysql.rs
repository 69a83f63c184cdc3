//! MySQL platform.

use std::collections::HashMap;

use crate::error::{DdlError, Result};
use crate::model::{Column, ForeignKey, Index, Table, TypeCode};

use super::{IdentitySupport, Platform, PlatformInfo, TypeMapping};

/// MySQL capability descriptor and renderer.
///
/// Indexes are embedded in CREATE TABLE, foreign keys are external ALTERs,
/// identifiers are backtick-quoted, and `AUTO_INCREMENT` is only valid on key
/// columns. TEXT/BLOB types cannot carry defaults.
#[derive(Debug)]
pub struct MySqlPlatform {
    info: PlatformInfo,
}

impl Default for MySqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlPlatform {
    /// Creates the MySQL platform.
    #[must_use]
    pub fn new() -> Self {
        let mut type_mappings = HashMap::new();
        type_mappings.insert(TypeCode::Bit, TypeMapping::new("BIT"));
        type_mappings.insert(TypeCode::TinyInt, TypeMapping::new("TINYINT"));
        type_mappings.insert(TypeCode::SmallInt, TypeMapping::new("SMALLINT"));
        type_mappings.insert(TypeCode::Integer, TypeMapping::new("INTEGER"));
        type_mappings.insert(TypeCode::BigInt, TypeMapping::new("BIGINT"));
        type_mappings.insert(TypeCode::Real, TypeMapping::new("FLOAT"));
        type_mappings.insert(TypeCode::Float, TypeMapping::new("DOUBLE"));
        type_mappings.insert(TypeCode::Double, TypeMapping::new("DOUBLE"));
        type_mappings.insert(
            TypeCode::Numeric,
            TypeMapping::new("NUMERIC({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Decimal,
            TypeMapping::new("DECIMAL({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Char,
            TypeMapping::new("CHAR({SIZE})").default_size("254").max_size(255),
        );
        type_mappings.insert(
            TypeCode::Varchar,
            TypeMapping::new("VARCHAR({SIZE})")
                .default_size("254")
                .max_size(65_535),
        );
        type_mappings.insert(TypeCode::LongVarchar, TypeMapping::new("LONGTEXT"));
        type_mappings.insert(TypeCode::Date, TypeMapping::new("DATE"));
        type_mappings.insert(TypeCode::Time, TypeMapping::new("TIME"));
        type_mappings.insert(TypeCode::Timestamp, TypeMapping::new("DATETIME"));
        type_mappings.insert(
            TypeCode::Binary,
            TypeMapping::new("BINARY({SIZE})").default_size("254").max_size(255),
        );
        type_mappings.insert(
            TypeCode::VarBinary,
            TypeMapping::new("VARBINARY({SIZE})")
                .default_size("254")
                .max_size(65_535),
        );
        type_mappings.insert(TypeCode::LongVarBinary, TypeMapping::new("LONGBLOB"));
        type_mappings.insert(TypeCode::Blob, TypeMapping::new("LONGBLOB"));
        type_mappings.insert(TypeCode::Clob, TypeMapping::new("LONGTEXT"));
        type_mappings.insert(TypeCode::Boolean, TypeMapping::new("TINYINT(1)"));

        Self {
            info: PlatformInfo {
                max_identifier_length: 64,
                pk_embedded: true,
                fk_embedded: false,
                indexes_embedded: true,
                identity_support: IdentitySupport::PrimaryKeyOnly,
                supports_default_for_long_types: false,
                identifier_quote: "`",
                string_escapes: &[("\\", "\\\\"), ("'", "''")],
                type_mappings,
                ..PlatformInfo::default()
            },
        }
    }
}

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn info(&self) -> &PlatformInfo {
        &self.info
    }

    fn auto_increment_clause(&self, table: &Table, column: &Column) -> Result<Option<String>> {
        if !column.primary_key {
            return Err(DdlError::UnsupportedFeature {
                platform: self.name().to_string(),
                feature: "identity on non-primary-key columns".to_string(),
                detail: format!("column '{}.{}'", table.name, column.name),
            });
        }
        Ok(Some("AUTO_INCREMENT".to_string()))
    }

    fn drop_index_sql(&self, table: &Table, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(&index.name),
            self.quote_identifier(&table.name)
        )
    }

    fn drop_foreign_key_sql(&self, table: &Table, fk: &ForeignKey) -> Result<String> {
        let name = crate::identifier::foreign_key_name(
            &table.name,
            fk,
            self.info.max_identifier_length,
        );
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_identifier(&table.name),
            self.quote_identifier(&name)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Database, Index};

    fn platform() -> MySqlPlatform {
        MySqlPlatform::new()
    }

    fn users_table() -> Table {
        Table::new("users")
            .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment())
            .column(Column::new("name", TypeCode::Varchar).size("255").required())
    }

    #[test]
    fn test_create_table_auto_increment() {
        let db = Database::new("test").table(users_table());
        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();

        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("CREATE TABLE `users`"));
        assert!(sql[0].contains("`id` INTEGER PRIMARY KEY AUTO_INCREMENT"));
        assert!(sql[0].contains("`name` VARCHAR(255) NOT NULL"));
    }

    #[test]
    fn test_auto_increment_requires_primary_key() {
        let table = Table::new("t")
            .column(Column::new("id", TypeCode::Integer).primary_key())
            .column(Column::new("counter", TypeCode::Integer).auto_increment());
        let db = Database::new("test").table(table);

        let err = platform().create_table_sql(&db, &db.tables[0]).unwrap_err();
        assert!(matches!(err, DdlError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_indexes_are_embedded() {
        let table = users_table().index(Index::new("idx_name").column("name"));
        let db = Database::new("test").table(table);

        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("INDEX `idx_name` (`name`)"));
    }

    #[test]
    fn test_long_type_default_is_dropped() {
        let table = Table::new("docs")
            .column(Column::new("id", TypeCode::Integer).primary_key())
            .column(Column::new("body", TypeCode::LongVarchar).default_value("x"));
        let db = Database::new("test").table(table);

        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();
        assert!(sql[0].contains("`body` LONGTEXT"));
        assert!(!sql[0].contains("DEFAULT"));
    }

    #[test]
    fn test_size_limit_enforced() {
        let column = Column::new("code", TypeCode::Char).size("9000");
        let err = platform().sql_type(&column).unwrap_err();
        assert!(matches!(err, DdlError::SizeExceeded { max: 255, .. }));
    }

    #[test]
    fn test_drop_index_names_table() {
        let index = Index::new("idx_name").column("name");
        let sql = platform().drop_index_sql(&users_table(), &index);
        assert_eq!(sql, "DROP INDEX `idx_name` ON `users`");
    }

    #[test]
    fn test_drop_foreign_key_syntax() {
        let fk = ForeignKey::new("users").named("fk_orders_users").reference("user_id", "id");
        let sql = platform().drop_foreign_key_sql(&Table::new("orders"), &fk).unwrap();
        assert_eq!(sql, "ALTER TABLE `orders` DROP FOREIGN KEY `fk_orders_users`");
    }

    #[test]
    fn test_string_escaping() {
        let column = Column::new("note", TypeCode::Varchar).size("40");
        let literal = platform().value_literal(&column, "it's a \\ path");
        assert_eq!(literal, "'it''s a \\\\ path'");
    }
}
