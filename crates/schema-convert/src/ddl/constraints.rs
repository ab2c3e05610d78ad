//! Constraint and index statement planning.
//!
//! Output order is fixed: primary keys, foreign keys, unique constraints,
//! then indexes. Multi-column keys and indexes keep their source ordinal order.
//! Each constraint and index is planned on its own: a name that cannot be
//! rendered rejects that object only.

use super::statement::{ConstraintBody, Ddl, Statement, StatementKind};
use crate::core::{
    normalize_table_name, ForeignKeyColumn, Index, KeyColumn, KeyType, ReservedWords, Table,
    TableMetadata,
};
use crate::error::{ConvertError, Result};
use tracing::warn;

/// A constraint or index that could not be rendered.
#[derive(Debug)]
pub struct RejectedObject {
    pub kind: StatementKind,
    pub object: String,
    pub error: ConvertError,
}

/// Planned statements for one table, plus the objects that were rejected.
#[derive(Debug, Default)]
pub struct ConstraintPlan {
    pub statements: Vec<Statement>,
    pub rejected: Vec<RejectedObject>,
}

impl ConstraintPlan {
    fn push(
        &mut self,
        table: &str,
        kind: StatementKind,
        object: &str,
        planned: Result<Statement>,
    ) {
        match planned {
            Ok(statement) => self.statements.push(statement),
            Err(error) => {
                warn!("{}: cannot plan {} {}: {}", table, kind, object, error);
                self.rejected.push(RejectedObject {
                    kind,
                    object: object.to_string(),
                    error,
                });
            }
        }
    }

    /// Drop statements and rejections whose kind is not wanted.
    pub fn retain_kinds(&mut self, wanted: impl Fn(StatementKind) -> bool) {
        self.statements.retain(|s| wanted(s.kind));
        self.rejected.retain(|r| wanted(r.kind));
    }
}

/// Plan all constraint and index statements for a table.
///
/// Fails only when the table name itself cannot be rendered.
pub fn plan_constraints(
    table: &Table,
    metadata: &TableMetadata,
    reserved: &ReservedWords,
) -> Result<ConstraintPlan> {
    let table_ident = reserved.ident(&table.name)?;
    let mut plan = ConstraintPlan::default();

    plan_keys(
        &mut plan,
        table,
        &table_ident,
        &metadata.key_columns,
        KeyType::PrimaryKey,
        reserved,
    );
    plan_foreign_keys(&mut plan, table, &table_ident, &metadata.foreign_keys, reserved);
    plan_keys(
        &mut plan,
        table,
        &table_ident,
        &metadata.key_columns,
        KeyType::Unique,
        reserved,
    );
    plan_indexes(&mut plan, table, &table_ident, &metadata.indexes, reserved);

    Ok(plan)
}

/// Rows that belong to a named constraint.
trait ConstraintRow {
    fn constraint_name(&self) -> &str;
}

impl ConstraintRow for KeyColumn {
    fn constraint_name(&self) -> &str {
        &self.constraint_name
    }
}

impl ConstraintRow for ForeignKeyColumn {
    fn constraint_name(&self) -> &str {
        &self.constraint_name
    }
}

/// Group rows by constraint name, keeping first-seen constraint order.
fn group_by_name<'a, T>(rows: impl Iterator<Item = &'a T>) -> Vec<(&'a str, Vec<&'a T>)>
where
    T: ConstraintRow + 'a,
{
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for row in rows {
        let key = row.constraint_name();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }
    groups
}

fn plan_keys(
    plan: &mut ConstraintPlan,
    table: &Table,
    table_ident: &str,
    key_columns: &[KeyColumn],
    key_type: KeyType,
    reserved: &ReservedWords,
) {
    let kind = match key_type {
        KeyType::PrimaryKey => StatementKind::PrimaryKey,
        KeyType::Unique => StatementKind::Unique,
        KeyType::Other => return,
    };

    let rows = key_columns.iter().filter(|k| k.key_type == key_type);

    for (name, mut members) in group_by_name(rows) {
        members.sort_by_key(|k| k.ordinal);
        let planned = (|| -> Result<Statement> {
            let columns = members
                .iter()
                .map(|k| reserved.ident(&k.column_name))
                .collect::<Result<Vec<_>>>()?;

            let body = match key_type {
                KeyType::PrimaryKey => ConstraintBody::PrimaryKey(columns),
                _ => ConstraintBody::Unique(columns),
            };
            let ddl = Ddl::AddConstraint {
                table: table_ident.to_string(),
                name: reserved.ident(name)?,
                body,
            };
            Ok(Statement::new(kind, &table.name, name, &ddl))
        })();
        plan.push(&table.name, kind, name, planned);
    }
}

fn plan_foreign_keys(
    plan: &mut ConstraintPlan,
    table: &Table,
    table_ident: &str,
    foreign_keys: &[ForeignKeyColumn],
    reserved: &ReservedWords,
) {
    for (name, mut members) in group_by_name(foreign_keys.iter()) {
        members.sort_by_key(|fk| fk.ordinal);

        let planned = (|| -> Result<Statement> {
            let columns = members
                .iter()
                .map(|fk| reserved.ident(&fk.column_name))
                .collect::<Result<Vec<_>>>()?;
            let ref_columns = members
                .iter()
                .map(|fk| reserved.ident(&fk.ref_column))
                .collect::<Result<Vec<_>>>()?;
            let ref_table = reserved.ident(&normalize_table_name(&members[0].ref_table))?;

            let ddl = Ddl::AddConstraint {
                table: table_ident.to_string(),
                name: reserved.ident(name)?,
                body: ConstraintBody::ForeignKey {
                    columns,
                    ref_table,
                    ref_columns,
                },
            };
            Ok(Statement::new(StatementKind::ForeignKey, &table.name, name, &ddl))
        })();
        plan.push(&table.name, StatementKind::ForeignKey, name, planned);
    }
}

fn plan_indexes(
    plan: &mut ConstraintPlan,
    table: &Table,
    table_ident: &str,
    indexes: &[Index],
    reserved: &ReservedWords,
) {
    for idx in indexes {
        if idx.columns.is_empty() {
            warn!("{}: index {} has no key columns, skipping", table.name, idx.name);
            continue;
        }

        let planned = (|| -> Result<Statement> {
            let columns = idx
                .columns
                .iter()
                .map(|c| reserved.ident(c))
                .collect::<Result<Vec<_>>>()?;

            let ddl = Ddl::CreateIndex {
                unique: idx.is_unique,
                name: reserved.ident(&idx.name)?,
                table: table_ident.to_string(),
                columns,
            };
            Ok(Statement::new(StatementKind::Index, &table.name, &idx.name, &ddl))
        })();
        plan.push(&table.name, StatementKind::Index, &idx.name, planned);
    }
}
