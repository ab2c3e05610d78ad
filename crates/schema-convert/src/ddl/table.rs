//! `CREATE TABLE` generation.

use super::statement::{ColumnDef, Ddl, Statement, StatementKind};
use crate::core::{ReservedWords, Table};
use crate::error::{ConvertError, Result};
use crate::typemap::{is_mapped, mssql_to_postgres};
use tracing::warn;

/// Build the `CREATE TABLE` statement for a table.
///
/// Columns keep their source order. Tables without columns are rejected with
/// [`ConvertError::EmptyTable`].
pub fn build_create_table(table: &Table, reserved: &ReservedWords) -> Result<Statement> {
    if table.columns.is_empty() {
        return Err(ConvertError::EmptyTable(table.name.clone()));
    }

    let table_ident = reserved.ident(&table.name)?;

    let mut columns = Vec::with_capacity(table.columns.len());
    let mut unmapped = Vec::new();

    for col in &table.columns {
        if !is_mapped(&col.data_type) {
            unmapped.push(format!("{}: {}", col.name, col.data_type));
        }

        let data_type = mssql_to_postgres(&col.data_type);
        check_type_name(&table.name, &col.name, data_type)?;

        columns.push(ColumnDef {
            name: reserved.ident(&col.name)?,
            data_type: data_type.to_string(),
            nullable: col.is_nullable,
        });
    }

    if !unmapped.is_empty() {
        warn!(
            "{}: passing through unmapped source types [{}]",
            table.name,
            unmapped.join(", ")
        );
    }

    let ddl = Ddl::CreateTable {
        table: table_ident,
        columns,
    };

    Ok(Statement::new(StatementKind::CreateTable, &table.name, &table.name, &ddl)
        .with_unmapped_types(unmapped))
}

/// Type names are interpolated verbatim, so only plain words are accepted.
fn check_type_name(table: &str, column: &str, data_type: &str) -> Result<()> {
    let valid = !data_type.trim().is_empty()
        && data_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ');

    if valid {
        Ok(())
    } else {
        Err(ConvertError::metadata(
            table,
            format!("column {} has unsupported type name {:?}", column, data_type),
        ))
    }
}
