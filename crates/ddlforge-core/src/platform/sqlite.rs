//! SQLite platform.

use std::collections::HashMap;

use crate::error::{DdlError, Result};
use crate::model::{Column, Database, ForeignKey, Table, TypeCode};

use super::{IdentitySupport, Platform, PlatformInfo, TypeMapping};

/// SQLite capability descriptor and renderer.
///
/// Foreign keys only exist inside CREATE TABLE; adding or dropping one on an
/// existing table is unsupported and reported as such. Columns cannot be
/// modified in place. Declared type names are kept close to the abstract
/// codes since SQLite accepts arbitrary decltypes, which lets a read-back
/// model resolve to the same types.
#[derive(Debug)]
pub struct SqlitePlatform {
    info: PlatformInfo,
}

impl Default for SqlitePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlitePlatform {
    /// Creates the SQLite platform.
    #[must_use]
    pub fn new() -> Self {
        let mut type_mappings = HashMap::new();
        type_mappings.insert(TypeCode::Bit, TypeMapping::new("BIT"));
        type_mappings.insert(TypeCode::TinyInt, TypeMapping::new("TINYINT"));
        type_mappings.insert(TypeCode::SmallInt, TypeMapping::new("SMALLINT"));
        type_mappings.insert(TypeCode::Integer, TypeMapping::new("INTEGER"));
        type_mappings.insert(TypeCode::BigInt, TypeMapping::new("BIGINT"));
        type_mappings.insert(TypeCode::Real, TypeMapping::new("REAL"));
        type_mappings.insert(TypeCode::Float, TypeMapping::new("FLOAT"));
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
            TypeMapping::new("CHAR({SIZE})").default_size("254"),
        );
        type_mappings.insert(
            TypeCode::Varchar,
            TypeMapping::new("VARCHAR({SIZE})").default_size("254"),
        );
        type_mappings.insert(TypeCode::LongVarchar, TypeMapping::new("LONGVARCHAR"));
        type_mappings.insert(TypeCode::Date, TypeMapping::new("DATE"));
        type_mappings.insert(TypeCode::Time, TypeMapping::new("TIME"));
        type_mappings.insert(TypeCode::Timestamp, TypeMapping::new("TIMESTAMP"));
        type_mappings.insert(
            TypeCode::Binary,
            TypeMapping::new("BINARY({SIZE})").default_size("254"),
        );
        type_mappings.insert(
            TypeCode::VarBinary,
            TypeMapping::new("VARBINARY({SIZE})").default_size("254"),
        );
        type_mappings.insert(TypeCode::LongVarBinary, TypeMapping::new("LONGVARBINARY"));
        type_mappings.insert(TypeCode::Blob, TypeMapping::new("BLOB"));
        type_mappings.insert(TypeCode::Clob, TypeMapping::new("CLOB"));
        type_mappings.insert(TypeCode::Boolean, TypeMapping::new("BOOLEAN"));

        // AUTOINCREMENT is only valid on INTEGER PRIMARY KEY, so the integer
        // family promotes to plain INTEGER for identity columns.
        let mut identity_type_mappings = HashMap::new();
        for code in [
            TypeCode::TinyInt,
            TypeCode::SmallInt,
            TypeCode::Integer,
            TypeCode::BigInt,
        ] {
            identity_type_mappings.insert(code, TypeMapping::new("INTEGER"));
        }

        Self {
            info: PlatformInfo {
                fk_embedded: true,
                identity_support: IdentitySupport::PrimaryKeyOnly,
                supports_alter_column: false,
                type_mappings,
                identity_type_mappings,
                ..PlatformInfo::default()
            },
        }
    }
}

impl Platform for SqlitePlatform {
    fn name(&self) -> &'static str {
        "sqlite"
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
        Ok(Some("AUTOINCREMENT".to_string()))
    }

    fn add_foreign_key_sql(
        &self,
        _db: &Database,
        table: &Table,
        fk: &ForeignKey,
    ) -> Result<String> {
        Err(DdlError::UnsupportedFeature {
            platform: self.name().to_string(),
            feature: "adding foreign keys to existing tables".to_string(),
            detail: format!(
                "foreign key to '{}' on table '{}'",
                fk.foreign_table, table.name
            ),
        })
    }

    fn drop_foreign_key_sql(&self, table: &Table, fk: &ForeignKey) -> Result<String> {
        Err(DdlError::UnsupportedFeature {
            platform: self.name().to_string(),
            feature: "dropping foreign keys from existing tables".to_string(),
            detail: format!(
                "foreign key to '{}' on table '{}'",
                fk.foreign_table, table.name
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> SqlitePlatform {
        SqlitePlatform::new()
    }

    #[test]
    fn test_foreign_keys_are_embedded() {
        let parent = Table::new("users").column(Column::new("id", TypeCode::Integer).primary_key());
        let child = Table::new("orders")
            .column(Column::new("id", TypeCode::Integer).primary_key())
            .column(Column::new("user_id", TypeCode::Integer).required())
            .foreign_key(ForeignKey::new("users").reference("user_id", "id"));
        let db = Database::new("test").table(parent).table(child);

        let p = platform();
        let sql = p.create_table_sql(&db, &db.tables[1]).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\")"));
        assert!(p.create_foreign_keys_sql(&db, &db.tables[1]).unwrap().is_empty());
    }

    #[test]
    fn test_autoincrement_clause_follows_primary_key() {
        let table = Table::new("t")
            .column(Column::new("id", TypeCode::BigInt).primary_key().auto_increment());
        let db = Database::new("test").table(table);

        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();
        assert!(sql[0].contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
    }

    #[test]
    fn test_modify_column_unsupported() {
        let table = Table::new("t").column(Column::new("v", TypeCode::Varchar).size("10"));
        let column = table.find_column("v").unwrap();

        let err = platform().alter_column_sql(&table, column, false).unwrap_err();
        assert!(matches!(err, DdlError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_add_column_still_supported() {
        let table = Table::new("t").column(Column::new("v", TypeCode::Varchar).size("10"));
        let column = table.find_column("v").unwrap();

        let sql = platform().alter_column_sql(&table, column, true).unwrap();
        assert_eq!(sql, "ALTER TABLE \"t\" ADD COLUMN \"v\" VARCHAR(10)");
    }

    #[test]
    fn test_foreign_key_alteration_unsupported() {
        let table = Table::new("orders");
        let fk = ForeignKey::new("users").reference("user_id", "id");
        let db = Database::new("test");

        assert!(platform().add_foreign_key_sql(&db, &table, &fk).is_err());
        assert!(platform().drop_foreign_key_sql(&table, &fk).is_err());
    }

    #[test]
    fn test_decltypes_round_trip_cleanly() {
        let p = platform();
        let column = Column::new("v", TypeCode::Varchar).size("40");
        assert_eq!(p.sql_type(&column).unwrap(), "VARCHAR(40)");
        assert_eq!(p.native_base_type(&column).unwrap(), "VARCHAR");
    }
}
