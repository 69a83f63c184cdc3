//! Error types for model rendering and schema alteration.

use crate::model::TypeCode;

/// Errors raised while rendering DDL or computing schema alterations.
///
/// Unsupported-feature usage is reported as a value rather than a panic so
/// callers can decide whether to skip or abort. The renderer and differ never
/// suppress their own structural errors; an error means the partial output
/// must not be executed.
#[derive(Debug, thiserror::Error)]
pub enum DdlError {
    /// The platform does not support a requested feature.
    #[error("Platform '{platform}' does not support {feature}: {detail}")]
    UnsupportedFeature {
        /// Platform name.
        platform: String,
        /// Feature that was requested.
        feature: String,
        /// What requested it.
        detail: String,
    },

    /// No native type mapping exists for an abstract type code.
    #[error("No native type mapping for {type_code} (column '{column}')")]
    UnmappedType {
        /// Offending column name.
        column: String,
        /// The unmapped abstract type code.
        type_code: TypeCode,
    },

    /// A column size exceeds the platform maximum for its native type.
    #[error("Size {size} of column '{column}' exceeds the maximum {max} of native type '{native_type}'")]
    SizeExceeded {
        /// Offending column name.
        column: String,
        /// Native type whose limit was exceeded.
        native_type: String,
        /// Requested size.
        size: u64,
        /// Platform maximum.
        max: u64,
    },

    /// A reference names a table that does not exist in the model.
    #[error("Unknown table '{table}' referenced by {referenced_by}")]
    UnknownTable {
        /// The missing table name.
        table: String,
        /// The referencing object.
        referenced_by: String,
    },

    /// A reference names a column that does not exist in its table.
    #[error("Unknown column '{column}' in table '{table}' referenced by {referenced_by}")]
    UnknownColumn {
        /// Owning table name.
        table: String,
        /// The missing column name.
        column: String,
        /// The referencing object.
        referenced_by: String,
    },

    /// A foreign key declares no column references.
    #[error("Foreign key '{name}' on table '{table}' has no column references")]
    EmptyForeignKey {
        /// Owning table name.
        table: String,
        /// Effective constraint name.
        name: String,
    },

    /// No platform is registered under the given name.
    #[error("No such platform: '{0}'")]
    NoSuchPlatform(String),
}

/// Result type for rendering and alteration operations.
pub type Result<T> = std::result::Result<T, DdlError>;
