//! PostgreSQL DDL generation from source table metadata.
//!
//! Translation is pure: builders return [`Statement`] values and never touch
//! a database. Execution belongs to the orchestrator.

mod constraints;
mod statement;
mod table;

pub use constraints::{plan_constraints, ConstraintPlan, RejectedObject};
pub use statement::{ColumnDef, ConstraintBody, Ddl, Statement, StatementKind};
pub use table::build_create_table;
