//! Live-schema reader for SQLite.
//!
//! Reintrospects a live database into the abstract schema model, using the
//! same type codes and size conventions the renderer writes, so a read-back
//! model diffs cleanly against the model it was created from.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{debug, info, warn};

use ddlforge_core::model::{Column, Database, ForeignKey, Index, Reference, Table, TypeCode};

use crate::error::Result;

/// Filters applied while reading a live schema.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Catalog name. SQLite has no catalogs; kept for interface parity and
    /// ignored by this reader.
    pub catalog: Option<String>,
    /// SQL LIKE pattern matched against table names.
    pub schema_pattern: String,
    /// Object types to model.
    pub table_types: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            catalog: None,
            schema_pattern: "%".to_string(),
            table_types: vec!["TABLE".to_string()],
        }
    }
}

impl ReadOptions {
    /// Sets the table-name pattern.
    #[must_use]
    pub fn schema_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.schema_pattern = pattern.into();
        self
    }

    /// Sets the object types to model.
    #[must_use]
    pub fn table_types(mut self, types: Vec<String>) -> Self {
        self.table_types = types;
        self
    }
}

/// Reads the live schema into a [`Database`] model named `name`.
///
/// Tables come from `sqlite_master` (internal `sqlite_` objects skipped),
/// columns from `PRAGMA table_info`, indexes from `PRAGMA index_list` /
/// `index_xinfo` and foreign keys from `PRAGMA foreign_key_list`. Index and
/// foreign-key reads are partial-tolerant: a driver error leaves that
/// sub-list empty with a warning rather than failing the whole read.
pub async fn read_database(
    pool: &SqlitePool,
    name: &str,
    options: &ReadOptions,
) -> Result<Database> {
    let wanted_types: Vec<String> = options
        .table_types
        .iter()
        .map(|t| match t.to_ascii_uppercase().as_str() {
            "VIEW" => "view".to_string(),
            _ => "table".to_string(),
        })
        .collect();

    let rows = sqlx::query(
        "SELECT name, type, sql FROM sqlite_master \
         WHERE name NOT LIKE 'sqlite_%' AND name LIKE ?1 ORDER BY name",
    )
    .bind(&options.schema_pattern)
    .fetch_all(pool)
    .await?;

    let mut database = Database::new(name);
    for row in rows {
        let object_type: String = row.get("type");
        if !wanted_types.iter().any(|t| t == &object_type) {
            continue;
        }
        let table_name: String = row.get("name");
        let create_sql: Option<String> = row.get("sql");
        database = database.table(read_table(pool, &table_name, create_sql.as_deref()).await?);
    }

    resolve_implicit_references(&mut database);
    info!(
        database = name,
        tables = database.tables.len(),
        "live schema read complete"
    );
    Ok(database)
}

async fn read_table(
    pool: &SqlitePool,
    table_name: &str,
    create_sql: Option<&str>,
) -> Result<Table> {
    debug!(table = table_name, "reading table");
    let mut table = Table::new(table_name);

    let has_autoincrement = create_sql
        .map(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"))
        .unwrap_or(false);

    let rows = sqlx::query(&format!("PRAGMA table_info({})", quote(table_name)))
        .fetch_all(pool)
        .await?;
    for row in rows {
        let column_name: String = row.get("name");
        let decltype: String = row.get("type");
        let notnull: i64 = row.get("notnull");
        let default: Option<String> = row.get("dflt_value");
        let pk: i64 = row.get("pk");

        let (type_code, size) = parse_decltype(&decltype);
        let mut column = Column::new(column_name, type_code);
        if let Some(size) = size {
            column = column.size(size);
        }
        if pk > 0 {
            column = column.primary_key();
            if has_autoincrement {
                column = column.auto_increment();
            }
        }
        // SQLite reports notnull=0 for INTEGER PRIMARY KEY even though the
        // column can never hold NULL.
        if notnull != 0 || pk > 0 {
            column = column.required();
        }
        if let Some(default) = default.as_deref().and_then(strip_default) {
            column = column.default_value(default);
        }
        table = table.column(column);
    }

    match read_indexes(pool, table_name).await {
        Ok(indexes) => {
            for index in indexes {
                table = table.index(index);
            }
        }
        Err(err) => warn!(table = table_name, error = %err, "index read failed, skipping"),
    }

    match read_foreign_keys(pool, table_name).await {
        Ok(fks) => {
            for fk in fks {
                table = table.foreign_key(fk);
            }
        }
        Err(err) => warn!(table = table_name, error = %err, "foreign key read failed, skipping"),
    }

    Ok(table)
}

async fn read_indexes(pool: &SqlitePool, table_name: &str) -> sqlx::Result<Vec<Index>> {
    let rows = sqlx::query(&format!("PRAGMA index_list({})", quote(table_name)))
        .fetch_all(pool)
        .await?;

    let mut indexes = Vec::new();
    for row in rows {
        let index_name: String = row.get("name");
        if index_name.starts_with("sqlite_autoindex") {
            continue;
        }
        let unique: i64 = row.get("unique");

        let mut index = Index::new(&index_name);
        if unique != 0 {
            index = index.unique();
        }

        let column_rows = sqlx::query(&format!("PRAGMA index_xinfo({})", quote(&index_name)))
            .fetch_all(pool)
            .await?;
        for column_row in column_rows {
            // Rows with a negative cid are the rowid / expression filler
            // entries, not real key columns.
            let cid: i64 = column_row.get("cid");
            let key: i64 = column_row.get("key");
            if cid < 0 || key == 0 {
                continue;
            }
            let column_name: Option<String> = column_row.get("name");
            let descending: i64 = column_row.get("desc");
            if let Some(column_name) = column_name {
                index = if descending != 0 {
                    index.column_descending(column_name)
                } else {
                    index.column(column_name)
                };
            }
        }
        indexes.push(index);
    }
    Ok(indexes)
}

async fn read_foreign_keys(pool: &SqlitePool, table_name: &str) -> sqlx::Result<Vec<ForeignKey>> {
    let rows = sqlx::query(&format!("PRAGMA foreign_key_list({})", quote(table_name)))
        .fetch_all(pool)
        .await?;

    let mut fks: Vec<ForeignKey> = Vec::new();
    let mut current_id: Option<i64> = None;
    for row in rows {
        let id: i64 = row.get("id");
        let seq: i64 = row.get("seq");
        let foreign_table: String = row.get("table");
        let local: String = row.get("from");
        // NULL when the reference targets the foreign table's primary key
        // implicitly; resolved in a post-pass once all tables are read.
        let foreign: Option<String> = row.get("to");

        // A new logical key starts when the id changes or the sequence
        // counter resets.
        if current_id != Some(id) || seq == 0 {
            fks.push(ForeignKey::new(&foreign_table));
            current_id = Some(id);
        }
        if let Some(fk) = fks.last_mut() {
            fk.references
                .push(Reference::new(local, foreign.unwrap_or_default()));
        }
    }
    Ok(fks)
}

/// Fills in reference targets left empty by implicit primary-key references,
/// using the referenced table's primary key columns in order.
fn resolve_implicit_references(database: &mut Database) {
    let pk_columns: Vec<(String, Vec<String>)> = database
        .tables
        .iter()
        .map(|table| {
            (
                table.name.clone(),
                table
                    .primary_key_columns()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect(),
            )
        })
        .collect();

    for table in &mut database.tables {
        for fk in &mut table.foreign_keys {
            let Some((_, pk)) = pk_columns
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&fk.foreign_table))
            else {
                continue;
            };
            for (position, reference) in fk.references.iter_mut().enumerate() {
                if reference.foreign.is_empty() {
                    if let Some(pk_name) = pk.get(position) {
                        reference.foreign = pk_name.clone();
                    }
                }
            }
        }
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Parses a stored declared type back into an abstract code plus size.
fn parse_decltype(decltype: &str) -> (TypeCode, Option<String>) {
    let upper = decltype.trim().to_ascii_uppercase();
    let (base, size) = match upper.find('(') {
        Some(open) => {
            let size = upper[open + 1..]
                .trim_end_matches(')')
                .trim()
                .to_string();
            (upper[..open].trim().to_string(), Some(size))
        }
        None => (upper.clone(), None),
    };

    let code = match base.as_str() {
        "BIT" => TypeCode::Bit,
        "TINYINT" => TypeCode::TinyInt,
        "SMALLINT" => TypeCode::SmallInt,
        "INT" | "INTEGER" | "MEDIUMINT" => TypeCode::Integer,
        "BIGINT" => TypeCode::BigInt,
        "REAL" => TypeCode::Real,
        "FLOAT" => TypeCode::Float,
        "DOUBLE" | "DOUBLE PRECISION" => TypeCode::Double,
        "NUMERIC" => TypeCode::Numeric,
        "DECIMAL" => TypeCode::Decimal,
        "CHAR" | "CHARACTER" | "NCHAR" => TypeCode::Char,
        "VARCHAR" | "NVARCHAR" | "VARYING CHARACTER" => TypeCode::Varchar,
        "LONGVARCHAR" | "TEXT" => TypeCode::LongVarchar,
        "DATE" => TypeCode::Date,
        "TIME" => TypeCode::Time,
        "TIMESTAMP" | "DATETIME" => TypeCode::Timestamp,
        "BINARY" => TypeCode::Binary,
        "VARBINARY" => TypeCode::VarBinary,
        "LONGVARBINARY" => TypeCode::LongVarBinary,
        "BLOB" | "" => TypeCode::Blob,
        "CLOB" => TypeCode::Clob,
        "BOOLEAN" | "BOOL" => TypeCode::Boolean,
        _ => TypeCode::Varchar,
    };
    (code, size)
}

/// Strips vendor wrapping from a metadata default value: surrounding
/// parentheses, then surrounding quotes with doubled-quote unescaping. A
/// literal NULL means no default.
fn strip_default(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    while value.len() >= 2 && value.starts_with('(') && value.ends_with(')') {
        value = value[1..value.len() - 1].trim();
    }
    if value.eq_ignore_ascii_case("NULL") {
        return None;
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return Some(value[1..value.len() - 1].replace("''", "'"));
    }
    Some(value.to_string())
}
