//! Vendor-neutral database schema modeling, DDL generation and diffing.
//!
//! `ddlforge-core` describes a relational schema once, in an abstract model,
//! and renders it as native DDL for multiple database platforms. Its core is
//! the schema differ: given the schema as it exists and the schema as it
//! should be, it computes the minimal ordered ALTER script between the two.
//!
//! # Architecture
//!
//! - **Model** - `Database`/`Table`/`Column`/`Index`/`ForeignKey` value types
//!   with fluent builders and abstract, vendor-neutral type codes
//! - **Platform** - per-vendor capability descriptor (`PlatformInfo`) plus a
//!   `Platform` trait whose default methods render standard DDL from the
//!   descriptor; MySQL, PostgreSQL, Oracle and SQLite ship built in
//! - **Differ** - computes dependency-ordered alteration scripts with
//!   policy-controlled drops and column modification
//! - **Registry** - explicit case-insensitive name-to-platform lookup, no
//!   global state
//! - **Coerce** - rewrites a model onto a restricted type set, cascading
//!   through foreign keys
//!
//! # Example
//!
//! ```rust
//! use ddlforge_core::prelude::*;
//!
//! # fn main() -> ddlforge_core::error::Result<()> {
//! let desired = Database::new("shop").table(
//!     Table::new("users")
//!         .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment())
//!         .column(Column::new("email", TypeCode::Varchar).size("254").required())
//!         .index(Index::new("idx_users_email").unique().column("email")),
//! );
//!
//! let registry = PlatformRegistry::with_builtins();
//! let platform = registry.get("postgresql")?;
//!
//! // Full creation script.
//! let script = platform.create_database_sql(&desired)?;
//! assert!(script[0].starts_with("CREATE TABLE \"users\""));
//!
//! // Minimal alteration script against an empty database.
//! let differ = SchemaDiffer::new(platform.as_ref(), AlterationOptions::default());
//! let statements = differ.alter_database_sql(&Database::new("shop"), &desired)?;
//! assert!(!statements.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod coerce;
pub mod differ;
pub mod error;
pub mod identifier;
pub mod model;
pub mod platform;
pub mod registry;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::coerce::coerce_types;
    pub use crate::differ::{AlterationOptions, SchemaDiffer};
    pub use crate::error::{DdlError, Result};
    pub use crate::model::{
        Column, Database, ForeignKey, Index, IndexColumn, Reference, Table, TypeCode,
    };
    pub use crate::platform::{
        IdentitySupport, MySqlPlatform, OraclePlatform, Platform, PlatformInfo, PostgresPlatform,
        SqlitePlatform, TypeMapping,
    };
    pub use crate::registry::PlatformRegistry;
}
