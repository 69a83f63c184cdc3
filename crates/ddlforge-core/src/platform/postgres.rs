//! PostgreSQL platform.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Column, Table, TypeCode};

use super::{Platform, PlatformInfo, TypeMapping};

/// PostgreSQL capability descriptor and renderer.
///
/// Identity columns are expressed by promoting the integer types to their
/// SERIAL pseudo-types, so no trailing clause is emitted. Column modification
/// uses `ALTER COLUMN` actions instead of `MODIFY`.
#[derive(Debug)]
pub struct PostgresPlatform {
    info: PlatformInfo,
}

impl Default for PostgresPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresPlatform {
    /// Creates the PostgreSQL platform.
    #[must_use]
    pub fn new() -> Self {
        let mut type_mappings = HashMap::new();
        type_mappings.insert(TypeCode::Bit, TypeMapping::new("BOOLEAN"));
        type_mappings.insert(TypeCode::TinyInt, TypeMapping::new("SMALLINT"));
        type_mappings.insert(TypeCode::SmallInt, TypeMapping::new("SMALLINT"));
        type_mappings.insert(TypeCode::Integer, TypeMapping::new("INTEGER"));
        type_mappings.insert(TypeCode::BigInt, TypeMapping::new("BIGINT"));
        type_mappings.insert(TypeCode::Real, TypeMapping::new("REAL"));
        type_mappings.insert(TypeCode::Float, TypeMapping::new("DOUBLE PRECISION"));
        type_mappings.insert(TypeCode::Double, TypeMapping::new("DOUBLE PRECISION"));
        type_mappings.insert(
            TypeCode::Numeric,
            TypeMapping::new("NUMERIC({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Decimal,
            TypeMapping::new("NUMERIC({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Char,
            TypeMapping::new("CHAR({SIZE})").default_size("254"),
        );
        type_mappings.insert(
            TypeCode::Varchar,
            TypeMapping::new("VARCHAR({SIZE})").default_size("254"),
        );
        type_mappings.insert(TypeCode::LongVarchar, TypeMapping::new("TEXT"));
        type_mappings.insert(TypeCode::Date, TypeMapping::new("DATE"));
        type_mappings.insert(TypeCode::Time, TypeMapping::new("TIME"));
        type_mappings.insert(TypeCode::Timestamp, TypeMapping::new("TIMESTAMP"));
        type_mappings.insert(TypeCode::Binary, TypeMapping::new("BYTEA"));
        type_mappings.insert(TypeCode::VarBinary, TypeMapping::new("BYTEA"));
        type_mappings.insert(TypeCode::LongVarBinary, TypeMapping::new("BYTEA"));
        type_mappings.insert(TypeCode::Blob, TypeMapping::new("BYTEA"));
        type_mappings.insert(TypeCode::Clob, TypeMapping::new("TEXT"));
        type_mappings.insert(TypeCode::Boolean, TypeMapping::new("BOOLEAN"));

        let mut identity_type_mappings = HashMap::new();
        identity_type_mappings.insert(TypeCode::TinyInt, TypeMapping::new("SMALLSERIAL"));
        identity_type_mappings.insert(TypeCode::SmallInt, TypeMapping::new("SMALLSERIAL"));
        identity_type_mappings.insert(TypeCode::Integer, TypeMapping::new("SERIAL"));
        identity_type_mappings.insert(TypeCode::BigInt, TypeMapping::new("BIGSERIAL"));

        Self {
            info: PlatformInfo {
                max_identifier_length: 63,
                type_mappings,
                identity_type_mappings,
                ..PlatformInfo::default()
            },
        }
    }
}

impl Platform for PostgresPlatform {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn info(&self) -> &PlatformInfo {
        &self.info
    }

    // SERIAL already implies the sequence-backed default.
    fn auto_increment_clause(&self, _table: &Table, _column: &Column) -> Result<Option<String>> {
        Ok(None)
    }

    fn alter_column_sql(&self, table: &Table, column: &Column, is_new: bool) -> Result<String> {
        if is_new {
            return Ok(format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(&table.name),
                self.column_definition(table, column)?
            ));
        }

        let quoted_column = self.quote_identifier(&column.name);
        let mut actions = vec![format!(
            "ALTER COLUMN {quoted_column} TYPE {}",
            self.sql_type(column)?
        )];
        if column.required {
            actions.push(format!("ALTER COLUMN {quoted_column} SET NOT NULL"));
        } else {
            actions.push(format!("ALTER COLUMN {quoted_column} DROP NOT NULL"));
        }
        match column.default.as_deref() {
            Some(default) if !default.is_empty() => {
                actions.push(format!(
                    "ALTER COLUMN {quoted_column} SET DEFAULT {}",
                    self.value_literal(column, default)
                ));
            }
            _ => actions.push(format!("ALTER COLUMN {quoted_column} DROP DEFAULT")),
        }

        Ok(format!(
            "ALTER TABLE {} {}",
            self.quote_identifier(&table.name),
            actions.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Database;

    fn platform() -> PostgresPlatform {
        PostgresPlatform::new()
    }

    #[test]
    fn test_identity_promotes_to_serial() {
        let table = Table::new("users")
            .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment());
        let db = Database::new("test").table(table);

        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();
        assert!(sql[0].contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(!sql[0].contains("GENERATED"));
    }

    #[test]
    fn test_bigint_identity_promotes_to_bigserial() {
        let column = Column::new("id", TypeCode::BigInt).auto_increment();
        assert_eq!(platform().sql_type(&column).unwrap(), "BIGSERIAL");
    }

    #[test]
    fn test_bit_and_boolean_share_native_type() {
        let p = platform();
        let bit = Column::new("flag", TypeCode::Bit);
        let boolean = Column::new("flag", TypeCode::Boolean);
        assert_eq!(
            p.native_base_type(&bit).unwrap(),
            p.native_base_type(&boolean).unwrap()
        );
    }

    #[test]
    fn test_modify_column_uses_alter_column_actions() {
        let table = Table::new("users")
            .column(Column::new("name", TypeCode::Varchar).size("128").required());
        let column = table.find_column("name").unwrap();

        let sql = platform().alter_column_sql(&table, column, false).unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE \"users\" ALTER COLUMN \"name\" TYPE VARCHAR(128), \
             ALTER COLUMN \"name\" SET NOT NULL, \
             ALTER COLUMN \"name\" DROP DEFAULT"
        );
    }

    #[test]
    fn test_modify_column_sets_default() {
        let table = Table::new("users")
            .column(Column::new("status", TypeCode::Varchar).size("16").default_value("new"));
        let column = table.find_column("status").unwrap();

        let sql = platform().alter_column_sql(&table, column, false).unwrap();
        assert!(sql.contains("DROP NOT NULL"));
        assert!(sql.contains("SET DEFAULT 'new'"));
    }

    #[test]
    fn test_identifier_shortened_to_limit() {
        let long = "a".repeat(80);
        let quoted = platform().quote_identifier(&long);
        assert_eq!(quoted.len(), 63 + 2);
    }
}
