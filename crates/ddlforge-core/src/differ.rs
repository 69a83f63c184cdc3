//! Schema differ and alteration engine.
//!
//! Compares a current model against a desired model and produces the minimal
//! ordered statement list turning one into the other. Both inputs are
//! immutable snapshots; the differ never mutates them and recomputes from
//! scratch on every pass. An error aborts the pass and the partial statement
//! list must be discarded by the caller.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Column, Database, Table};
use crate::platform::Platform;

/// Policy flags controlling what the differ actually emits.
///
/// With a flag off the corresponding change is still detected but rendered as
/// an advisory comment instead of a statement, so the output documents what
/// was skipped.
#[derive(Debug, Clone, Copy)]
pub struct AlterationOptions {
    /// Emit DROP statements for tables, columns, indexes and foreign keys
    /// absent from the desired model. Off by default.
    pub do_drops: bool,
    /// Emit ALTER statements for changed columns. On by default.
    pub modify_columns: bool,
}

impl Default for AlterationOptions {
    fn default() -> Self {
        Self {
            do_drops: false,
            modify_columns: true,
        }
    }
}

impl AlterationOptions {
    /// Enables or disables DROP emission.
    #[must_use]
    pub fn do_drops(mut self, value: bool) -> Self {
        self.do_drops = value;
        self
    }

    /// Enables or disables column modification.
    #[must_use]
    pub fn modify_columns(mut self, value: bool) -> Self {
        self.modify_columns = value;
        self
    }
}

/// Computes alteration scripts for one platform.
pub struct SchemaDiffer<'a> {
    platform: &'a dyn Platform,
    options: AlterationOptions,
}

impl<'a> SchemaDiffer<'a> {
    /// Creates a differ for `platform` with the given policy flags.
    #[must_use]
    pub fn new(platform: &'a dyn Platform, options: AlterationOptions) -> Self {
        Self { platform, options }
    }

    /// Produces the ordered statements that alter `current` into `desired`.
    ///
    /// Desired tables are walked in declaration order. Genuinely new tables
    /// are created immediately, but their foreign keys are held back until
    /// every table body exists; a circular foreign-key dependency between two
    /// tables that are both new in the same pass is not resolvable this way
    /// and must be applied in two passes by the caller. Tables present only
    /// in `current` are dropped last, in reverse declaration order.
    pub fn alter_database_sql(
        &self,
        current: &Database,
        desired: &Database,
    ) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        let mut created: Vec<&Table> = Vec::new();

        for desired_table in &desired.tables {
            match current.find_table(&desired_table.name) {
                None => {
                    debug!(table = %desired_table.name, "creating new table");
                    statements.extend(self.platform.create_table_sql(desired, desired_table)?);
                    created.push(desired_table);
                }
                Some(current_table) => {
                    self.alter_table(current_table, desired_table, desired, &mut statements)?;
                }
            }
        }

        for table in created {
            statements.extend(self.platform.create_foreign_keys_sql(desired, table)?);
        }

        for current_table in current.tables.iter().rev() {
            if desired.find_table(&current_table.name).is_some() {
                continue;
            }
            if self.options.do_drops {
                debug!(table = %current_table.name, "dropping table");
                statements.extend(self.platform.drop_table_sql(current_table));
            } else {
                statements.push(self.platform.comment_sql(&format!(
                    "table '{}' is no longer needed; drop skipped",
                    current_table.name
                )));
            }
        }

        info!(
            platform = self.platform.name(),
            statements = statements.len(),
            "alteration pass complete"
        );
        Ok(statements)
    }

    /// Emits the per-table changes in new-before-old order: column adds and
    /// modifications, new foreign keys, new indexes, then foreign key drops,
    /// column drops and index drops.
    fn alter_table(
        &self,
        current: &Table,
        desired: &Table,
        desired_db: &Database,
        statements: &mut Vec<String>,
    ) -> Result<()> {
        for desired_column in &desired.columns {
            match current.find_column(&desired_column.name) {
                None => {
                    debug!(table = %desired.name, column = %desired_column.name, "adding column");
                    statements.push(self.platform.alter_column_sql(desired, desired_column, true)?);
                }
                Some(current_column) => {
                    if !self.column_differs(current_column, desired_column)? {
                        continue;
                    }
                    if self.options.modify_columns {
                        debug!(table = %desired.name, column = %desired_column.name, "modifying column");
                        statements
                            .push(self.platform.alter_column_sql(desired, desired_column, false)?);
                    } else {
                        statements.push(self.platform.comment_sql(&format!(
                            "column '{}.{}' differs from the desired definition; modification skipped",
                            desired.name, desired_column.name
                        )));
                    }
                }
            }
        }

        for desired_fk in &desired.foreign_keys {
            let matched = current.foreign_keys.iter().any(|fk| fk.references_match(desired_fk));
            if !matched {
                statements.push(self.platform.add_foreign_key_sql(desired_db, desired, desired_fk)?);
            }
        }

        for desired_index in &desired.indexes {
            if current.find_index(&desired_index.name).is_none() {
                statements.push(self.platform.create_index_sql(desired, desired_index)?);
            }
        }

        for current_fk in &current.foreign_keys {
            let matched = desired.foreign_keys.iter().any(|fk| fk.references_match(current_fk));
            if matched {
                continue;
            }
            if self.options.do_drops {
                statements.push(self.platform.drop_foreign_key_sql(current, current_fk)?);
            } else {
                statements.push(self.platform.comment_sql(&format!(
                    "foreign key to '{}' on table '{}' is no longer needed; drop skipped",
                    current_fk.foreign_table, current.name
                )));
            }
        }

        for current_column in &current.columns {
            if desired.find_column(&current_column.name).is_some() {
                continue;
            }
            if self.options.do_drops {
                debug!(table = %current.name, column = %current_column.name, "dropping column");
                statements.push(self.platform.drop_column_sql(desired, &current_column.name));
            } else {
                statements.push(self.platform.comment_sql(&format!(
                    "column '{}.{}' is no longer needed; drop skipped",
                    current.name, current_column.name
                )));
            }
        }

        for current_index in &current.indexes {
            if desired.find_index(&current_index.name).is_some() {
                continue;
            }
            // Some platforms create an implicit index backing the primary
            // key; an index made up solely of PK columns is left alone.
            if self.backs_primary_key(current, current_index.columns.iter().map(|c| c.name.as_str()))
            {
                continue;
            }
            if self.options.do_drops {
                statements.push(self.platform.drop_index_sql(current, current_index));
            } else {
                statements.push(self.platform.comment_sql(&format!(
                    "index '{}' on table '{}' is no longer needed; drop skipped",
                    current_index.name, current.name
                )));
            }
        }

        Ok(())
    }

    fn backs_primary_key<'c>(
        &self,
        table: &Table,
        mut column_names: impl Iterator<Item = &'c str>,
    ) -> bool {
        column_names.all(|name| {
            table
                .find_column(name)
                .is_some_and(|column| column.primary_key)
        })
    }

    /// Whether a matched column needs modification.
    ///
    /// Types are compared through the platform's native mapping so that two
    /// abstract codes sharing one native type never produce a spurious diff.
    /// Size participates only when the desired column declares one, and the
    /// default only when the desired column declares a non-empty one; scale
    /// is excluded entirely.
    fn column_differs(&self, current: &Column, desired: &Column) -> Result<bool> {
        if self.platform.native_base_type(desired)? != self.platform.native_base_type(current)? {
            return Ok(true);
        }
        if desired.required != current.required {
            return Ok(true);
        }
        if let Some(desired_size) = desired.normalized_size() {
            if Some(desired_size) != current.normalized_size() {
                return Ok(true);
            }
        }
        match desired.default.as_deref() {
            Some(default) if !default.is_empty() => {
                if current.default.as_deref() != Some(default) {
                    return Ok(true);
                }
            }
            _ => {}
        }
        Ok(false)
    }
}
