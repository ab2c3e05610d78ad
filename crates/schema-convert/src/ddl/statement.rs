//! Typed DDL templates.
//!
//! A [`Ddl`] value only ever holds identifiers that were validated and
//! escaped by [`ReservedWords::ident`](crate::core::ReservedWords::ident)
//! and type names checked by the table builder. Rendering is plain
//! formatting; no value-level data is ever interpolated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    CreateTable,
    PrimaryKey,
    ForeignKey,
    Unique,
    Index,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::PrimaryKey => "PRIMARY KEY",
            StatementKind::ForeignKey => "FOREIGN KEY",
            StatementKind::Unique => "UNIQUE",
            StatementKind::Index => "INDEX",
        };
        f.write_str(s)
    }
}

/// Column definition inside a `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Body of an `ALTER TABLE ... ADD CONSTRAINT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintBody {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
    },
}

/// A DDL statement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ddl {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    AddConstraint {
        table: String,
        name: String,
        body: ConstraintBody,
    },
    CreateIndex {
        unique: bool,
        name: String,
        table: String,
        columns: Vec<String>,
    },
}

impl fmt::Display for Ddl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ddl::CreateTable { table, columns } => {
                let cols: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let null = if c.nullable { "NULL" } else { "NOT NULL" };
                        format!("{} {} {}", c.name, c.data_type, null)
                    })
                    .collect();
                write!(f, "CREATE TABLE {} ({});", table, cols.join(", "))
            }
            Ddl::AddConstraint { table, name, body } => {
                write!(f, "ALTER TABLE {} ADD CONSTRAINT {} ", table, name)?;
                match body {
                    ConstraintBody::PrimaryKey(cols) => write!(f, "PRIMARY KEY ({});", cols.join(", ")),
                    ConstraintBody::Unique(cols) => write!(f, "UNIQUE ({});", cols.join(", ")),
                    ConstraintBody::ForeignKey {
                        columns,
                        ref_table,
                        ref_columns,
                    } => write!(
                        f,
                        "FOREIGN KEY ({}) REFERENCES {} ({});",
                        columns.join(", "),
                        ref_table,
                        ref_columns.join(", ")
                    ),
                }
            }
            Ddl::CreateIndex {
                unique,
                name,
                table,
                columns,
            } => {
                let unique = if *unique { "UNIQUE " } else { "" };
                write!(
                    f,
                    "CREATE {}INDEX {} ON {} ({});",
                    unique,
                    name,
                    table,
                    columns.join(", ")
                )
            }
        }
    }
}

/// A rendered statement ready to be executed against the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement kind.
    pub kind: StatementKind,

    /// Target table the statement belongs to.
    pub table: String,

    /// Name of the object it creates (table, constraint, or index).
    pub object: String,

    /// SQL text.
    pub sql: String,

    /// Unmapped source types involved, as `column: type`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped_types: Vec<String>,
}

impl Statement {
    pub fn new(
        kind: StatementKind,
        table: impl Into<String>,
        object: impl Into<String>,
        ddl: &Ddl,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            object: object.into(),
            sql: ddl.to_string(),
            unmapped_types: Vec::new(),
        }
    }

    pub fn with_unmapped_types(mut self, unmapped: Vec<String>) -> Self {
        self.unmapped_types = unmapped;
        self
    }
}
