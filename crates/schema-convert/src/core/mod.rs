//! Core types shared by the builders and the orchestrator.
//!
//! - [`schema`]: Table, column, key, and index metadata
//! - [`identifier`]: Identifier validation and reserved-word escaping

pub mod identifier;
pub mod schema;

pub use identifier::{quote_pg, validate_identifier, ReservedWords};
pub use schema::{
    normalize_table_name, Column, ExistingTableSet, ForeignKeyColumn, Index, KeyColumn, KeyType,
    Table, TableMetadata,
};
