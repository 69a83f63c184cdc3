//! Live-schema introspection and batch execution for SQLite.
//!
//! `ddlforge-live` connects the abstract schema machinery in `ddlforge-core`
//! to a running database: the reader reintrospects the live schema into a
//! model the differ can compare against, and the batch executor applies
//! generated scripts statement by statement. The pool is always borrowed from
//! the caller; nothing here retains a connection across calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use ddlforge_core::prelude::*;
//! use ddlforge_live::prelude::*;
//!
//! let platform = SqlitePlatform::new();
//! let executor = BatchExecutor::new(&pool);
//! executor.execute_statements(&platform.create_database_sql(&desired)?).await?;
//!
//! let current = read_database(&pool, "live", &ReadOptions::default()).await?;
//! let differ = SchemaDiffer::new(&platform, AlterationOptions::default());
//! let changes = differ.alter_database_sql(&current, &desired)?;
//! executor.execute_statements(&changes).await?;
//! ```

pub mod error;
pub mod executor;
pub mod reader;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{LiveError, Result};
    pub use crate::executor::{BatchExecutor, BatchReport};
    pub use crate::reader::{read_database, ReadOptions};
}
