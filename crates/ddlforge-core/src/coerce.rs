//! Schema type coercion.
//!
//! Rewrites a model's column types onto a restricted target type set, for
//! feeding a model built against one type vocabulary to a platform that only
//! handles a subset. The input model is never mutated; the pass returns a new
//! model with the rewrite applied.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{Database, TypeCode};

/// Returns a copy of `db` with column types rewritten per `target_map`.
///
/// Every column whose type code appears as a key in `target_map` takes the
/// mapped code. The change then cascades through foreign keys: a local column
/// referencing a rewritten column takes the referenced column's new type, so
/// key pairs stay type-compatible across reference chains.
#[must_use]
pub fn coerce_types(db: &Database, target_map: &HashMap<TypeCode, TypeCode>) -> Database {
    let mut coerced = db.clone();

    for table in &mut coerced.tables {
        for column in &mut table.columns {
            if let Some(&target) = target_map.get(&column.type_code) {
                debug!(
                    table = %table.name,
                    column = %column.name,
                    from = %column.type_code,
                    to = %target,
                    "coercing column type"
                );
                column.type_code = target;
            }
        }
    }

    // Reference chains can span several tables, so repeat until no local
    // column changes. A chain settles one link per round; the round cap
    // stops mutually-referencing keys with irreconcilable types from
    // oscillating forever.
    let max_rounds = coerced.tables.iter().map(|t| t.columns.len()).sum::<usize>() + 1;
    for _ in 0..max_rounds {
        let updates = pending_cascades(&coerced);
        if updates.is_empty() {
            break;
        }
        for (table_name, column_name, target) in updates {
            let Some(table) = coerced
                .tables
                .iter_mut()
                .find(|t| t.name.eq_ignore_ascii_case(&table_name))
            else {
                continue;
            };
            if let Some(column) = table.find_column_mut(&column_name) {
                debug!(
                    table = %table_name,
                    column = %column_name,
                    to = %target,
                    "cascading coerced type through foreign key"
                );
                column.type_code = target;
            }
        }
    }

    coerced
}

/// Collects foreign-key local columns whose type disagrees with the column
/// they reference, as (table, column, target type) triples.
fn pending_cascades(db: &Database) -> Vec<(String, String, TypeCode)> {
    let mut updates = Vec::new();
    for table in &db.tables {
        for fk in &table.foreign_keys {
            let Some(foreign_table) = db.find_table(&fk.foreign_table) else {
                continue;
            };
            for reference in &fk.references {
                let Some(foreign_column) = foreign_table.find_column(&reference.foreign) else {
                    continue;
                };
                let Some(local_column) = table.find_column(&reference.local) else {
                    continue;
                };
                if local_column.type_code != foreign_column.type_code {
                    updates.push((
                        table.name.clone(),
                        local_column.name.clone(),
                        foreign_column.type_code,
                    ));
                }
            }
        }
    }
    updates
}
