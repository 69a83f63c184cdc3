//! Oracle platform.

use std::collections::HashMap;

use crate::error::Result;
use crate::identifier::shorten;
use crate::model::{Column, Table, TypeCode};

use super::{Platform, PlatformInfo, TypeMapping};

/// Oracle capability descriptor and renderer.
///
/// Identifiers are limited to 30 characters. Identity columns are emulated
/// with a sequence plus a BEFORE INSERT trigger created alongside the table
/// and dropped with it. ADD/MODIFY column definitions are parenthesized.
#[derive(Debug)]
pub struct OraclePlatform {
    info: PlatformInfo,
}

impl Default for OraclePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl OraclePlatform {
    /// Creates the Oracle platform.
    #[must_use]
    pub fn new() -> Self {
        let mut type_mappings = HashMap::new();
        type_mappings.insert(TypeCode::Bit, TypeMapping::new("NUMBER(1)"));
        type_mappings.insert(TypeCode::TinyInt, TypeMapping::new("NUMBER(3)"));
        type_mappings.insert(TypeCode::SmallInt, TypeMapping::new("NUMBER(5)"));
        type_mappings.insert(TypeCode::Integer, TypeMapping::new("NUMBER(10)"));
        type_mappings.insert(TypeCode::BigInt, TypeMapping::new("NUMBER(19)"));
        type_mappings.insert(TypeCode::Real, TypeMapping::new("FLOAT"));
        type_mappings.insert(TypeCode::Float, TypeMapping::new("DOUBLE PRECISION"));
        type_mappings.insert(TypeCode::Double, TypeMapping::new("DOUBLE PRECISION"));
        type_mappings.insert(
            TypeCode::Numeric,
            TypeMapping::new("NUMBER({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Decimal,
            TypeMapping::new("NUMBER({SIZE})").default_size("15"),
        );
        type_mappings.insert(
            TypeCode::Char,
            TypeMapping::new("CHAR({SIZE})").default_size("254").max_size(2000),
        );
        type_mappings.insert(
            TypeCode::Varchar,
            TypeMapping::new("VARCHAR2({SIZE})")
                .default_size("254")
                .max_size(4000),
        );
        type_mappings.insert(TypeCode::LongVarchar, TypeMapping::new("CLOB"));
        type_mappings.insert(TypeCode::Date, TypeMapping::new("DATE"));
        type_mappings.insert(TypeCode::Time, TypeMapping::new("DATE"));
        type_mappings.insert(TypeCode::Timestamp, TypeMapping::new("TIMESTAMP"));
        type_mappings.insert(
            TypeCode::Binary,
            TypeMapping::new("RAW({SIZE})").default_size("254").max_size(2000),
        );
        type_mappings.insert(
            TypeCode::VarBinary,
            TypeMapping::new("RAW({SIZE})").default_size("254").max_size(2000),
        );
        type_mappings.insert(TypeCode::LongVarBinary, TypeMapping::new("BLOB"));
        type_mappings.insert(TypeCode::Blob, TypeMapping::new("BLOB"));
        type_mappings.insert(TypeCode::Clob, TypeMapping::new("CLOB"));
        type_mappings.insert(TypeCode::Boolean, TypeMapping::new("NUMBER(1)"));

        Self {
            info: PlatformInfo {
                max_identifier_length: 30,
                type_mappings,
                ..PlatformInfo::default()
            },
        }
    }

    fn sequence_name(&self, table: &Table) -> String {
        shorten(
            &format!("{}_seq", table.name),
            self.info.max_identifier_length,
        )
    }

    fn trigger_name(&self, table: &Table) -> String {
        shorten(
            &format!("{}_trg", table.name),
            self.info.max_identifier_length,
        )
    }

    fn identity_column<'a>(&self, table: &'a Table) -> Option<&'a Column> {
        table.columns.iter().find(|c| c.auto_increment)
    }
}

impl Platform for OraclePlatform {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn info(&self) -> &PlatformInfo {
        &self.info
    }

    // Identity is emulated through the sequence/trigger pair instead of a
    // column clause.
    fn auto_increment_clause(&self, _table: &Table, _column: &Column) -> Result<Option<String>> {
        Ok(None)
    }

    fn auxiliary_table_create_sql(&self, table: &Table) -> Vec<String> {
        let Some(column) = self.identity_column(table) else {
            return Vec::new();
        };
        let sequence = self.quote_identifier(&self.sequence_name(table));
        let quoted_table = self.quote_identifier(&table.name);
        let quoted_column = self.quote_identifier(&column.name);
        vec![
            format!("CREATE SEQUENCE {sequence}"),
            format!(
                "CREATE OR REPLACE TRIGGER {} BEFORE INSERT ON {quoted_table} FOR EACH ROW \
                 WHEN (new.{quoted_column} IS NULL) \
                 BEGIN SELECT {sequence}.nextval INTO :new.{quoted_column} FROM DUAL; END",
                self.quote_identifier(&self.trigger_name(table))
            ),
        ]
    }

    fn auxiliary_table_drop_sql(&self, table: &Table) -> Vec<String> {
        if self.identity_column(table).is_none() {
            return Vec::new();
        }
        vec![
            format!(
                "DROP TRIGGER {}",
                self.quote_identifier(&self.trigger_name(table))
            ),
            format!(
                "DROP SEQUENCE {}",
                self.quote_identifier(&self.sequence_name(table))
            ),
        ]
    }

    fn alter_column_sql(&self, table: &Table, column: &Column, is_new: bool) -> Result<String> {
        let verb = if is_new { "ADD" } else { "MODIFY" };
        Ok(format!(
            "ALTER TABLE {} {verb} ({})",
            self.quote_identifier(&table.name),
            self.column_definition(table, column)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Database;

    fn platform() -> OraclePlatform {
        OraclePlatform::new()
    }

    #[test]
    fn test_identity_emulated_with_sequence_and_trigger() {
        let table = Table::new("orders")
            .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment());
        let db = Database::new("test").table(table);

        let sql = platform().create_table_sql(&db, &db.tables[0]).unwrap();
        assert_eq!(sql.len(), 3);
        assert!(sql[0].contains("\"id\" NUMBER(10) PRIMARY KEY"));
        assert_eq!(sql[1], "CREATE SEQUENCE \"orders_seq\"");
        assert!(sql[2].starts_with("CREATE OR REPLACE TRIGGER \"orders_trg\""));
        assert!(sql[2].contains("\"orders_seq\".nextval"));
    }

    #[test]
    fn test_drop_table_drops_trigger_and_sequence_first() {
        let table = Table::new("orders")
            .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment());

        let sql = platform().drop_table_sql(&table);
        assert_eq!(
            sql,
            vec![
                "DROP TRIGGER \"orders_trg\"".to_string(),
                "DROP SEQUENCE \"orders_seq\"".to_string(),
                "DROP TABLE \"orders\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_auxiliary_statements_without_identity() {
        let table = Table::new("plain").column(Column::new("id", TypeCode::Integer).primary_key());
        assert_eq!(platform().drop_table_sql(&table), vec!["DROP TABLE \"plain\""]);
    }

    #[test]
    fn test_integer_types_resolve_to_number() {
        let p = platform();
        let tiny = Column::new("a", TypeCode::TinyInt);
        let big = Column::new("b", TypeCode::BigInt);
        assert_eq!(p.native_base_type(&tiny).unwrap(), "NUMBER(3)");
        assert_eq!(p.native_base_type(&big).unwrap(), "NUMBER(19)");
    }

    #[test]
    fn test_modify_column_parenthesized() {
        let table =
            Table::new("users").column(Column::new("name", TypeCode::Varchar).size("64").required());
        let column = table.find_column("name").unwrap();

        let sql = platform().alter_column_sql(&table, column, false).unwrap();
        assert_eq!(sql, "ALTER TABLE \"users\" MODIFY (\"name\" VARCHAR2(64) NOT NULL)");
    }

    #[test]
    fn test_identifier_limit_is_thirty() {
        let name = "a_rather_long_oracle_table_name_indeed";
        let quoted = platform().quote_identifier(name);
        assert_eq!(quoted.len(), 30 + 2);
    }

    #[test]
    fn test_varchar_size_limit() {
        let column = Column::new("body", TypeCode::Varchar).size("8000");
        let err = platform().sql_type(&column).unwrap_err();
        assert!(matches!(err, crate::error::DdlError::SizeExceeded { max: 4000, .. }));
    }
}
