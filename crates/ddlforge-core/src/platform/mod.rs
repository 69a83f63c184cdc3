//! Platform capability descriptors and the DDL renderer.
//!
//! A [`PlatformInfo`] is pure data: the capabilities and syntax rules of one
//! database vendor. The [`Platform`] trait turns that data into SQL text; its
//! default methods implement standard rendering driven entirely by the
//! descriptor, and vendor modules override only where the vendor's syntax
//! genuinely deviates.

mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use mysql::MySqlPlatform;
pub use oracle::OraclePlatform;
pub use postgres::PostgresPlatform;
pub use sqlite::SqlitePlatform;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{DdlError, Result};
use crate::identifier::{foreign_key_name, shorten};
use crate::model::{Column, Database, ForeignKey, Index, Table, TypeCode};

/// Placeholder in a native type name where the column size is substituted.
pub const SIZE_PLACEHOLDER: &str = "{SIZE}";

/// How far a platform's identity-column (auto-increment) support extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySupport {
    /// No identity columns at all.
    Unsupported,
    /// Identity columns only on primary key columns.
    PrimaryKeyOnly,
    /// Identity columns on any column.
    AnyColumn,
}

/// Maps one abstract type code to a platform's native type syntax.
#[derive(Debug, Clone)]
pub struct TypeMapping {
    /// Native type name, optionally containing [`SIZE_PLACEHOLDER`].
    pub native_type: String,
    /// Size used when the column declares none.
    pub default_size: Option<String>,
    /// Maximum size the platform accepts for this native type.
    pub max_size: Option<u64>,
}

impl TypeMapping {
    /// Creates a mapping to a fixed native type name.
    #[must_use]
    pub fn new(native_type: impl Into<String>) -> Self {
        Self {
            native_type: native_type.into(),
            default_size: None,
            max_size: None,
        }
    }

    /// Sets the size used when a column declares none.
    #[must_use]
    pub fn default_size(mut self, size: impl Into<String>) -> Self {
        self.default_size = Some(size.into());
        self
    }

    /// Sets the maximum accepted size.
    #[must_use]
    pub fn max_size(mut self, max: u64) -> Self {
        self.max_size = Some(max);
        self
    }

    /// The native type name with the size placeholder stripped, used when
    /// comparing resolved types across models. Literal precision parentheses
    /// (e.g. `NUMBER(19)`) are part of the type and stay.
    #[must_use]
    pub fn base_name(&self) -> String {
        self.native_type
            .replace(&format!("({SIZE_PLACEHOLDER})"), "")
            .replace(SIZE_PLACEHOLDER, "")
            .trim()
            .to_string()
    }

    /// Renders the native type, substituting the size placeholder.
    #[must_use]
    pub fn format(&self, size: Option<&str>) -> String {
        let effective = size.or(self.default_size.as_deref());
        match effective {
            Some(s) => self.native_type.replace(SIZE_PLACEHOLDER, s.trim()),
            None => self
                .native_type
                .replace(&format!("({SIZE_PLACEHOLDER})"), "")
                .replace(SIZE_PLACEHOLDER, ""),
        }
    }
}

/// Immutable per-vendor record of capabilities and syntax rules.
///
/// Populated once at platform construction time and shared read-only by the
/// renderer and differ. Requesting a mapping for an unmapped type code
/// returns `None` rather than failing; callers decide how to react.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    /// Maximum identifier length; longer names are shortened.
    pub max_identifier_length: usize,
    /// Whether primary keys are declared inside CREATE TABLE.
    pub pk_embedded: bool,
    /// Whether foreign keys are declared inside CREATE TABLE.
    pub fk_embedded: bool,
    /// Whether indexes are declared inside CREATE TABLE.
    pub indexes_embedded: bool,
    /// Identity-column support level.
    pub identity_support: IdentitySupport,
    /// Whether non-unique indexes are supported.
    pub supports_non_unique_index: bool,
    /// Whether existing columns can be altered in place.
    pub supports_alter_column: bool,
    /// Whether unbounded "long" types may carry default values.
    pub supports_default_for_long_types: bool,
    /// Token wrapped around identifiers.
    pub identifier_quote: &'static str,
    /// Token wrapped around quoted value literals.
    pub value_quote: &'static str,
    /// Statement delimiter for script output.
    pub statement_delimiter: &'static str,
    /// Line-comment prefix.
    pub comment_prefix: &'static str,
    /// Character sequences escaped inside quoted values, as (from, to) pairs.
    pub string_escapes: &'static [(&'static str, &'static str)],
    /// Abstract type code to native type mappings.
    pub type_mappings: HashMap<TypeCode, TypeMapping>,
    /// Overriding mappings applied to auto-increment columns, for platforms
    /// that require type promotion for identity columns.
    pub identity_type_mappings: HashMap<TypeCode, TypeMapping>,
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self {
            max_identifier_length: 255,
            pk_embedded: true,
            fk_embedded: false,
            indexes_embedded: false,
            identity_support: IdentitySupport::AnyColumn,
            supports_non_unique_index: true,
            supports_alter_column: true,
            supports_default_for_long_types: true,
            identifier_quote: "\"",
            value_quote: "'",
            statement_delimiter: ";",
            comment_prefix: "--",
            string_escapes: &[("'", "''")],
            type_mappings: HashMap::new(),
            identity_type_mappings: HashMap::new(),
        }
    }
}

impl PlatformInfo {
    /// Looks up the native mapping for an abstract type code.
    #[must_use]
    pub fn type_mapping(&self, code: TypeCode) -> Option<&TypeMapping> {
        self.type_mappings.get(&code)
    }

    /// Looks up the mapping applied to auto-increment columns, falling back
    /// to the regular mapping when no promotion is defined.
    #[must_use]
    pub fn identity_type_mapping(&self, code: TypeCode) -> Option<&TypeMapping> {
        self.identity_type_mappings
            .get(&code)
            .or_else(|| self.type_mappings.get(&code))
    }
}

/// Vendor-specific SQL generation over a [`PlatformInfo`].
///
/// Default methods implement standard DDL driven by the descriptor. All
/// rendering is pure: methods return SQL text and never touch a connection.
/// Unsupported-feature usage and broken name references are reported as
/// [`DdlError`] values naming the offender; a returned error means any
/// statements already collected for the same pass must be discarded.
pub trait Platform: std::fmt::Debug + Send + Sync {
    /// Canonical (lowercase) platform name.
    fn name(&self) -> &'static str;

    /// The capability descriptor.
    fn info(&self) -> &PlatformInfo;

    /// Quotes an identifier, shortening it to the platform limit first.
    fn quote_identifier(&self, name: &str) -> String {
        let info = self.info();
        let short = shorten(name, info.max_identifier_length);
        format!("{q}{short}{q}", q = info.identifier_quote)
    }

    /// Renders an advisory comment line.
    fn comment_sql(&self, text: &str) -> String {
        format!("{} {}", self.info().comment_prefix, text)
    }

    /// Resolves a column's abstract type and size into native type syntax.
    ///
    /// Auto-increment columns go through the identity promotion mappings. A
    /// size beyond the native type's maximum is rejected, naming the column
    /// and the mapping.
    fn sql_type(&self, column: &Column) -> Result<String> {
        let info = self.info();
        let mapping = if column.auto_increment {
            info.identity_type_mapping(column.type_code)
        } else {
            info.type_mapping(column.type_code)
        }
        .ok_or_else(|| DdlError::UnmappedType {
            column: column.name.clone(),
            type_code: column.type_code,
        })?;

        if let (Some(size), Some(max)) = (column.size_value(), mapping.max_size) {
            if size > max {
                return Err(DdlError::SizeExceeded {
                    column: column.name.clone(),
                    native_type: mapping.native_type.clone(),
                    size,
                    max,
                });
            }
        }
        Ok(mapping.format(column.size.as_deref()))
    }

    /// The size-less native type a column resolves to, used by the differ to
    /// compare types across models without false positives from abstract
    /// codes that share a native type.
    fn native_base_type(&self, column: &Column) -> Result<String> {
        let mapping = self
            .info()
            .type_mapping(column.type_code)
            .ok_or_else(|| DdlError::UnmappedType {
                column: column.name.clone(),
                type_code: column.type_code,
            })?;
        Ok(mapping.base_name())
    }

    /// The clause appended to an identity column definition, or `None` when
    /// the promoted native type already implies it.
    ///
    /// Enforces the platform's identity support level: identity on a non-key
    /// column is a configuration error on `PrimaryKeyOnly` platforms.
    fn auto_increment_clause(&self, table: &Table, column: &Column) -> Result<Option<String>> {
        match self.info().identity_support {
            IdentitySupport::Unsupported => Err(DdlError::UnsupportedFeature {
                platform: self.name().to_string(),
                feature: "identity columns".to_string(),
                detail: format!("column '{}.{}'", table.name, column.name),
            }),
            IdentitySupport::PrimaryKeyOnly if !column.primary_key => {
                Err(DdlError::UnsupportedFeature {
                    platform: self.name().to_string(),
                    feature: "identity on non-primary-key columns".to_string(),
                    detail: format!("column '{}.{}'", table.name, column.name),
                })
            }
            _ => Ok(Some("GENERATED BY DEFAULT AS IDENTITY".to_string())),
        }
    }

    /// Renders a value literal with type-driven quoting and escaping.
    fn value_literal(&self, column: &Column, value: &str) -> String {
        let info = self.info();
        if column.type_code.requires_quotes() {
            let mut escaped = value.to_string();
            for (from, to) in info.string_escapes {
                escaped = escaped.replace(from, to);
            }
            format!("{q}{escaped}{q}", q = info.value_quote)
        } else {
            value.to_string()
        }
    }

    /// Renders one column definition for CREATE TABLE or ALTER TABLE.
    fn column_definition(&self, table: &Table, column: &Column) -> Result<String> {
        let info = self.info();
        let mut parts = vec![self.quote_identifier(&column.name), self.sql_type(column)?];

        if let Some(default) = column.default.as_deref() {
            if !default.is_empty() {
                if column.type_code.is_long() && !info.supports_default_for_long_types {
                    debug!(
                        column = %column.name,
                        "dropping default on long-typed column, platform does not support it"
                    );
                } else {
                    parts.push(format!("DEFAULT {}", self.value_literal(column, default)));
                }
            }
        }

        let inline_pk =
            info.pk_embedded && column.primary_key && table.primary_key_columns().len() == 1;
        if column.required && !inline_pk {
            parts.push("NOT NULL".to_string());
        }
        if inline_pk {
            parts.push("PRIMARY KEY".to_string());
        }
        if column.auto_increment {
            if let Some(clause) = self.auto_increment_clause(table, column)? {
                parts.push(clause);
            }
        }

        Ok(parts.join(" "))
    }

    /// Renders the `CONSTRAINT .. FOREIGN KEY .. REFERENCES ..` clause,
    /// validating every name reference against the model.
    fn foreign_key_clause(&self, db: &Database, table: &Table, fk: &ForeignKey) -> Result<String> {
        let name = foreign_key_name(&table.name, fk, self.info().max_identifier_length);
        if fk.references.is_empty() {
            return Err(DdlError::EmptyForeignKey {
                table: table.name.clone(),
                name,
            });
        }
        let foreign_table =
            db.find_table(&fk.foreign_table)
                .ok_or_else(|| DdlError::UnknownTable {
                    table: fk.foreign_table.clone(),
                    referenced_by: format!("foreign key '{name}' on table '{}'", table.name),
                })?;

        let mut locals = Vec::with_capacity(fk.references.len());
        let mut foreigns = Vec::with_capacity(fk.references.len());
        for reference in &fk.references {
            let local =
                table
                    .find_column(&reference.local)
                    .ok_or_else(|| DdlError::UnknownColumn {
                        table: table.name.clone(),
                        column: reference.local.clone(),
                        referenced_by: format!("foreign key '{name}'"),
                    })?;
            let foreign = foreign_table.find_column(&reference.foreign).ok_or_else(|| {
                DdlError::UnknownColumn {
                    table: foreign_table.name.clone(),
                    column: reference.foreign.clone(),
                    referenced_by: format!("foreign key '{name}'"),
                }
            })?;
            locals.push(self.quote_identifier(&local.name));
            foreigns.push(self.quote_identifier(&foreign.name));
        }

        Ok(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_identifier(&name),
            locals.join(", "),
            self.quote_identifier(&foreign_table.name),
            foreigns.join(", ")
        ))
    }

    /// Renders the clause declaring an index inside CREATE TABLE.
    fn embedded_index_clause(&self, table: &Table, index: &Index) -> Result<String> {
        let columns = self.index_column_list(table, index)?;
        let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
        Ok(format!(
            "{kind} {} ({columns})",
            self.quote_identifier(&index.name)
        ))
    }

    /// Renders CREATE TABLE plus any non-foreign-key statements the platform
    /// issues separately (external primary key, external indexes).
    ///
    /// Foreign keys are embedded when the platform embeds them; otherwise
    /// they are *not* rendered here — callers sequence them via
    /// [`Platform::create_foreign_keys_sql`] once all referenced tables exist.
    fn create_table_sql(&self, db: &Database, table: &Table) -> Result<Vec<String>> {
        let info = self.info();
        let mut lines = Vec::new();
        for column in &table.columns {
            lines.push(format!("  {}", self.column_definition(table, column)?));
        }

        let pk_columns = table.primary_key_columns();
        if info.pk_embedded && pk_columns.len() > 1 {
            let quoted: Vec<String> = pk_columns
                .iter()
                .map(|c| self.quote_identifier(&c.name))
                .collect();
            lines.push(format!("  PRIMARY KEY ({})", quoted.join(", ")));
        }

        if info.fk_embedded {
            for fk in &table.foreign_keys {
                lines.push(format!("  {}", self.foreign_key_clause(db, table, fk)?));
            }
        }

        if info.indexes_embedded {
            for index in &table.indexes {
                lines.push(format!("  {}", self.embedded_index_clause(table, index)?));
            }
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote_identifier(&table.name),
            lines.join(",\n")
        )];

        if !info.pk_embedded && !pk_columns.is_empty() {
            let quoted: Vec<String> = pk_columns
                .iter()
                .map(|c| self.quote_identifier(&c.name))
                .collect();
            statements.push(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
                self.quote_identifier(&table.name),
                self.quote_identifier(&format!("{}_PK", table.name)),
                quoted.join(", ")
            ));
        }

        if !info.indexes_embedded {
            for index in &table.indexes {
                statements.push(self.create_index_sql(table, index)?);
            }
        }

        statements.extend(self.auxiliary_table_create_sql(table));
        Ok(statements)
    }

    /// Extra statements a platform issues alongside CREATE TABLE, such as the
    /// sequence/trigger pair emulating identity columns. Empty by default.
    fn auxiliary_table_create_sql(&self, _table: &Table) -> Vec<String> {
        Vec::new()
    }

    /// Extra statements issued before DROP TABLE. Empty by default.
    fn auxiliary_table_drop_sql(&self, _table: &Table) -> Vec<String> {
        Vec::new()
    }

    /// Renders the external foreign key statements for a table. Empty when
    /// the platform embeds foreign keys in CREATE TABLE.
    fn create_foreign_keys_sql(&self, db: &Database, table: &Table) -> Result<Vec<String>> {
        if self.info().fk_embedded {
            return Ok(Vec::new());
        }
        table
            .foreign_keys
            .iter()
            .map(|fk| self.add_foreign_key_sql(db, table, fk))
            .collect()
    }

    /// Renders DROP TABLE plus any auxiliary objects the platform requires
    /// to drop in tandem.
    fn drop_table_sql(&self, table: &Table) -> Vec<String> {
        let mut statements = self.auxiliary_table_drop_sql(table);
        statements.push(format!(
            "DROP TABLE {}",
            self.quote_identifier(&table.name)
        ));
        statements
    }

    /// Renders a single ALTER TABLE ADD or MODIFY COLUMN statement.
    fn alter_column_sql(&self, table: &Table, column: &Column, is_new: bool) -> Result<String> {
        if is_new {
            return Ok(format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(&table.name),
                self.column_definition(table, column)?
            ));
        }
        if !self.info().supports_alter_column {
            return Err(DdlError::UnsupportedFeature {
                platform: self.name().to_string(),
                feature: "column modification".to_string(),
                detail: format!("column '{}.{}'", table.name, column.name),
            });
        }
        Ok(format!(
            "ALTER TABLE {} MODIFY {}",
            self.quote_identifier(&table.name),
            self.column_definition(table, column)?
        ))
    }

    /// Renders ALTER TABLE DROP COLUMN.
    fn drop_column_sql(&self, table: &Table, column_name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(&table.name),
            self.quote_identifier(column_name)
        )
    }

    /// Renders CREATE [UNIQUE] INDEX, validating column references and the
    /// platform's non-unique-index support.
    fn create_index_sql(&self, table: &Table, index: &Index) -> Result<String> {
        let columns = self.index_column_list(table, index)?;
        let unique = if index.unique { "UNIQUE " } else { "" };
        Ok(format!(
            "CREATE {unique}INDEX {} ON {} ({columns})",
            self.quote_identifier(&index.name),
            self.quote_identifier(&table.name)
        ))
    }

    /// Renders the quoted, validated column list of an index.
    fn index_column_list(&self, table: &Table, index: &Index) -> Result<String> {
        if !index.unique && !self.info().supports_non_unique_index {
            return Err(DdlError::UnsupportedFeature {
                platform: self.name().to_string(),
                feature: "non-unique indexes".to_string(),
                detail: format!("index '{}' on table '{}'", index.name, table.name),
            });
        }
        let mut quoted = Vec::with_capacity(index.columns.len());
        for index_column in &index.columns {
            let column =
                table
                    .find_column(&index_column.name)
                    .ok_or_else(|| DdlError::UnknownColumn {
                        table: table.name.clone(),
                        column: index_column.name.clone(),
                        referenced_by: format!("index '{}'", index.name),
                    })?;
            let mut part = self.quote_identifier(&column.name);
            if index_column.descending {
                part.push_str(" DESC");
            }
            quoted.push(part);
        }
        Ok(quoted.join(", "))
    }

    /// Renders DROP INDEX.
    fn drop_index_sql(&self, _table: &Table, index: &Index) -> String {
        format!("DROP INDEX {}", self.quote_identifier(&index.name))
    }

    /// Renders ALTER TABLE ADD CONSTRAINT FOREIGN KEY.
    fn add_foreign_key_sql(&self, db: &Database, table: &Table, fk: &ForeignKey) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            self.quote_identifier(&table.name),
            self.foreign_key_clause(db, table, fk)?
        ))
    }

    /// Renders ALTER TABLE DROP CONSTRAINT for a foreign key.
    fn drop_foreign_key_sql(&self, table: &Table, fk: &ForeignKey) -> Result<String> {
        let name = foreign_key_name(&table.name, fk, self.info().max_identifier_length);
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_identifier(&table.name),
            self.quote_identifier(&name)
        ))
    }

    /// Renders an INSERT statement with literal or placeholder values.
    ///
    /// `values` pairs column names with string-form values interpreted per
    /// the column type.
    fn insert_sql(
        &self,
        table: &Table,
        values: &[(&str, &str)],
        placeholders: bool,
    ) -> Result<String> {
        let mut columns = Vec::with_capacity(values.len());
        let mut rendered = Vec::with_capacity(values.len());
        for (name, value) in values {
            let column = table.find_column(name).ok_or_else(|| DdlError::UnknownColumn {
                table: table.name.clone(),
                column: (*name).to_string(),
                referenced_by: "INSERT statement".to_string(),
            })?;
            columns.push(self.quote_identifier(&column.name));
            rendered.push(if placeholders {
                "?".to_string()
            } else {
                self.value_literal(column, value)
            });
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote_identifier(&table.name),
            columns.join(", "),
            rendered.join(", ")
        ))
    }

    /// Renders an UPDATE statement keyed on `key_values`.
    fn update_sql(
        &self,
        table: &Table,
        assignments: &[(&str, &str)],
        key_values: &[(&str, &str)],
        placeholders: bool,
    ) -> Result<String> {
        let set = self.render_pairs(table, assignments, placeholders, "UPDATE statement")?;
        let keys = self.render_pairs(table, key_values, placeholders, "UPDATE statement")?;
        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            self.quote_identifier(&table.name),
            set.join(", "),
            keys.join(" AND ")
        ))
    }

    /// Renders a DELETE statement keyed on `key_values`. An empty key list
    /// deletes all rows.
    fn delete_sql(
        &self,
        table: &Table,
        key_values: &[(&str, &str)],
        placeholders: bool,
    ) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.quote_identifier(&table.name));
        if !key_values.is_empty() {
            let keys = self.render_pairs(table, key_values, placeholders, "DELETE statement")?;
            sql.push_str(" WHERE ");
            sql.push_str(&keys.join(" AND "));
        }
        Ok(sql)
    }

    /// Renders `column = value` pairs for UPDATE/DELETE clauses.
    fn render_pairs(
        &self,
        table: &Table,
        pairs: &[(&str, &str)],
        placeholders: bool,
        referenced_by: &str,
    ) -> Result<Vec<String>> {
        pairs
            .iter()
            .map(|(name, value)| {
                let column = table.find_column(name).ok_or_else(|| DdlError::UnknownColumn {
                    table: table.name.clone(),
                    column: (*name).to_string(),
                    referenced_by: referenced_by.to_string(),
                })?;
                let rendered = if placeholders {
                    "?".to_string()
                } else {
                    self.value_literal(column, value)
                };
                Ok(format!("{} = {rendered}", self.quote_identifier(&column.name)))
            })
            .collect()
    }

    /// Renders the full creation script for a database model: every table in
    /// declaration order, then every foreign key.
    fn create_database_sql(&self, db: &Database) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for table in &db.tables {
            statements.extend(self.create_table_sql(db, table)?);
        }
        for table in &db.tables {
            statements.extend(self.create_foreign_keys_sql(db, table)?);
        }
        Ok(statements)
    }

    /// Renders the drop script for a database model, in reverse declaration
    /// order to reduce forward-reference breakage.
    fn drop_database_sql(&self, db: &Database) -> Vec<String> {
        db.tables
            .iter()
            .rev()
            .flat_map(|table| self.drop_table_sql(table))
            .collect()
    }
}
