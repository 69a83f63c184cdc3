//! Vendor-neutral schema model.
//!
//! These types describe the structure of a relational database independently
//! of any vendor's type names or DDL syntax. Models are built once (from code,
//! from a serialized form, or by live reintrospection) and treated as
//! immutable snapshots during a diff/render pass.
//!
//! References between objects (foreign key to foreign table, index column to
//! table column) are held by *name*, not by pointer, and resolved by lookup at
//! render/diff time. Violated references surface as render-time errors, not at
//! model construction time.

use serde::{Deserialize, Serialize};

/// Abstract SQL column type codes, independent of any vendor's native names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    /// Single bit.
    Bit,
    /// Tiny integer (8-bit).
    TinyInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Single-precision floating point.
    Real,
    /// Floating point.
    Float,
    /// Double-precision floating point.
    Double,
    /// Exact numeric with precision/scale.
    Numeric,
    /// Exact decimal with precision/scale.
    Decimal,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Unbounded character string.
    LongVarchar,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    Timestamp,
    /// Fixed-length binary data.
    Binary,
    /// Variable-length binary data.
    VarBinary,
    /// Unbounded binary data.
    LongVarBinary,
    /// Binary large object.
    Blob,
    /// Character large object.
    Clob,
    /// Boolean.
    Boolean,
}

impl TypeCode {
    /// Returns the canonical name of this type code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Clob => "CLOB",
            Self::Boolean => "BOOLEAN",
        }
    }

    /// Returns true for numeric type codes (rendered without value quoting).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Bit
                | Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Real
                | Self::Float
                | Self::Double
                | Self::Numeric
                | Self::Decimal
                | Self::Boolean
        )
    }

    /// Returns true for character string type codes.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Char | Self::Varchar | Self::LongVarchar | Self::Clob
        )
    }

    /// Returns true for types whose values require quoting in SQL literals.
    #[must_use]
    pub fn requires_quotes(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::LongVarchar
                | Self::Clob
                | Self::Date
                | Self::Time
                | Self::Timestamp
        )
    }

    /// Returns true for unbounded "long" types, which some platforms refuse
    /// to give default values.
    #[must_use]
    pub fn is_long(&self) -> bool {
        matches!(
            self,
            Self::LongVarchar | Self::LongVarBinary | Self::Blob | Self::Clob
        )
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table column.
///
/// The size is kept in string form because it may encode a
/// `"precision,scale"` pair for decimal types. The default value is stored as
/// an untyped string and interpreted according to the type code at render
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Abstract type code.
    pub type_code: TypeCode,
    /// Optional size, possibly `"precision,scale"`.
    pub size: Option<String>,
    /// Scale (decimal digits), informational alongside `size`.
    pub scale: Option<i32>,
    /// Precision radix, metadata from reverse engineering.
    pub precision_radix: Option<i32>,
    /// Whether the column is NOT NULL.
    pub required: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Whether the column value is generated by the database.
    pub auto_increment: bool,
    /// Default value, untyped string form.
    pub default: Option<String>,
    /// Description, metadata only.
    pub description: Option<String>,
}

impl Column {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            size: None,
            scale: None,
            precision_radix: None,
            required: false,
            primary_key: false,
            auto_increment: false,
            default: None,
            description: None,
        }
    }

    /// Sets the size.
    #[must_use]
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the scale.
    #[must_use]
    pub fn scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the column as part of the primary key. Primary key columns are
    /// always NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.required = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Returns the numeric size (the precision part, if the size encodes a
    /// `"precision,scale"` pair).
    #[must_use]
    pub fn size_value(&self) -> Option<u64> {
        let size = self.size.as_deref()?;
        let precision = size.split(',').next()?.trim();
        precision.parse().ok()
    }

    /// Returns the size with whitespace normalized away, for comparisons.
    #[must_use]
    pub fn normalized_size(&self) -> Option<String> {
        self.size
            .as_deref()
            .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect())
    }
}

/// A column participating in an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    /// Name of the indexed table column.
    pub name: String,
    /// Descending sort order. Rarely used.
    pub descending: bool,
}

impl IndexColumn {
    /// Creates an ascending index column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }
}

/// An index over one or more columns of a table.
///
/// Uniqueness is a flag rather than a subtype; unique and non-unique indexes
/// differ only in that one boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Ordered indexed columns.
    pub columns: Vec<IndexColumn>,
}

impl Index {
    /// Creates a new non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            columns: Vec::new(),
        }
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds an indexed column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(IndexColumn::new(name));
        self
    }

    /// Adds an indexed column sorted descending.
    #[must_use]
    pub fn column_descending(mut self, name: impl Into<String>) -> Self {
        self.columns.push(IndexColumn {
            name: name.into(),
            descending: true,
        });
        self
    }
}

/// A local-column to foreign-column pair within a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Column name in the owning table.
    pub local: String,
    /// Column name in the referenced table.
    pub foreign: String,
}

impl Reference {
    /// Creates a new reference pair.
    #[must_use]
    pub fn new(local: impl Into<String>, foreign: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            foreign: foreign.into(),
        }
    }
}

/// A foreign key constraint.
///
/// The referenced table is held by name and resolved against the owning
/// database at render time. An unnamed foreign key gets a deterministic name
/// synthesized from the owning table, local columns, and foreign table
/// (see [`crate::identifier::foreign_key_name`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name, if one was declared.
    pub name: Option<String>,
    /// Name of the referenced table.
    pub foreign_table: String,
    /// Ordered local/foreign column pairs.
    pub references: Vec<Reference>,
}

impl ForeignKey {
    /// Creates a new unnamed foreign key.
    #[must_use]
    pub fn new(foreign_table: impl Into<String>) -> Self {
        Self {
            name: None,
            foreign_table: foreign_table.into(),
            references: Vec::new(),
        }
    }

    /// Sets the constraint name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a local/foreign column pair.
    #[must_use]
    pub fn reference(mut self, local: impl Into<String>, foreign: impl Into<String>) -> Self {
        self.references.push(Reference::new(local, foreign));
        self
    }

    /// Returns true when both keys reference the same table with the same
    /// column pairs, regardless of constraint names or pair order. This is
    /// how the differ matches foreign keys across models.
    #[must_use]
    pub fn references_match(&self, other: &ForeignKey) -> bool {
        if !self.foreign_table.eq_ignore_ascii_case(&other.foreign_table)
            || self.references.len() != other.references.len()
        {
            return false;
        }
        self.references.iter().all(|r| {
            other.references.iter().any(|o| {
                r.local.eq_ignore_ascii_case(&o.local) && r.foreign.eq_ignore_ascii_case(&o.foreign)
            })
        })
    }
}

/// A table: ordered columns, ordered foreign keys, and indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Catalog, read-only metadata from reverse engineering.
    pub catalog: Option<String>,
    /// Schema, read-only metadata from reverse engineering.
    pub schema: Option<String>,
    /// Description, metadata only.
    pub description: Option<String>,
    /// Ordered columns. The primary key is the ordered subset flagged
    /// `primary_key`; order is declaration order.
    pub columns: Vec<Column>,
    /// Ordered foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// Indexes (unordered).
    pub indexes: Vec<Index>,
}

impl Table {
    /// Creates a new empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: None,
            schema: None,
            description: None,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up a column by name, case-insensitively.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a column mutably by name, case-insensitively.
    #[must_use]
    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Looks up an index by name, case-insensitively.
    #[must_use]
    pub fn find_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Returns the primary key columns in declaration order.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Returns true if any column is flagged as part of the primary key.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }
}

/// A database: a named, ordered set of tables.
///
/// Table order is relevant; it drives CREATE ordering and (reversed) DROP
/// ordering. Table names are unique case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Database name.
    pub name: String,
    /// Ordered tables.
    pub tables: Vec<Table>,
}

impl Database {
    /// Creates a new empty database model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Looks up a table by name, case-insensitively.
    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Returns table names in declaration order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
