//! Schema metadata types for tables, columns, keys, and indexes.
//!
//! Descriptors are built once from source metadata and only read afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Lower-cased names of tables already present in the target.
///
/// Captured once at the start of a run and never refreshed.
pub type ExistingTableSet = HashSet<String>;

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Target table name (lower-cased).
    pub name: String,

    /// Table name as declared in the source.
    pub source_name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table descriptor, normalizing the target name to lower case.
    pub fn new(source_name: impl Into<String>, columns: Vec<Column>) -> Self {
        let source_name = source_name.into();
        Self {
            name: normalize_table_name(&source_name),
            source_name,
            columns,
        }
    }
}

/// Case-normalize a table name for the target and for existence checks.
pub fn normalize_table_name(name: &str) -> String {
    name.to_lowercase()
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Source data type (e.g., "int", "nvarchar").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable,
            ordinal_pos: 0,
        }
    }
}

/// Kind of key a key-column row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    PrimaryKey,
    Unique,
    Other,
}

impl KeyType {
    /// Parse the `CONSTRAINT_TYPE` value reported by SQL Server.
    pub fn from_constraint_type(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "PRIMARY KEY" => KeyType::PrimaryKey,
            "UNIQUE" => KeyType::Unique,
            _ => KeyType::Other,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::PrimaryKey => write!(f, "PRIMARY KEY"),
            KeyType::Unique => write!(f, "UNIQUE"),
            KeyType::Other => write!(f, "OTHER"),
        }
    }
}

/// One column of a primary key or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
    /// Constraint name.
    pub constraint_name: String,

    /// Key type.
    pub key_type: KeyType,

    /// Column name.
    pub column_name: String,

    /// Position within the key (1-based).
    pub ordinal: i32,
}

/// One column of a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyColumn {
    /// Constraint name.
    pub constraint_name: String,

    /// Local column name.
    pub column_name: String,

    /// Referenced table name (as declared in the source).
    pub ref_table: String,

    /// Referenced column name.
    pub ref_column: String,

    /// Position within the key (1-based).
    pub ordinal: i32,
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Key columns in ordinal order.
    pub columns: Vec<String>,

    /// Whether the index is unique.
    pub is_unique: bool,
}

/// Keys, foreign keys, and indexes of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub key_columns: Vec<KeyColumn>,
    pub foreign_keys: Vec<ForeignKeyColumn>,
    pub indexes: Vec<Index>,
}
