//! Per-table results and the aggregated run report.

use crate::ddl::{RejectedObject, Statement, StatementKind};
use crate::error::{ConvertError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one table's work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Table was created (constraint failures are listed separately).
    Created,
    /// Dry run: statements were planned but not executed.
    Planned,
    /// Table already existed in the target.
    Skipped,
    /// Table could not be created.
    Failed,
    /// Run was cancelled before the unit started.
    Cancelled,
}

/// A constraint or index that was not created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    pub kind: StatementKind,
    pub object: String,
    /// Empty when no statement could be rendered for the object.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sql: String,
    pub error: String,
}

impl StatementFailure {
    pub fn new(statement: &Statement, error: impl Into<String>) -> Self {
        Self {
            kind: statement.kind,
            object: statement.object.clone(),
            sql: statement.sql.clone(),
            error: error.into(),
        }
    }

    /// An object the planner could not render, so nothing was executed.
    pub fn rejected(rejected: &RejectedObject) -> Self {
        let err = ConvertError::statement(
            rejected.kind,
            &rejected.object,
            rejected.error.message_chain(),
        );
        Self {
            kind: rejected.kind,
            object: rejected.object.clone(),
            sql: String::new(),
            error: err.to_string(),
        }
    }
}

/// Result of one table's work unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    /// Target table name.
    pub table: String,

    pub status: TableStatus,

    /// Statements the target accepted.
    pub statements_applied: usize,

    /// Constraint and index statements the target rejected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StatementFailure>,

    /// Why the table itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Planned SQL (dry run only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<String>,

    /// Wall time spent in the unit.
    pub duration_ms: u64,
}

impl TableResult {
    fn with_status(table: impl Into<String>, status: TableStatus) -> Self {
        Self {
            table: table.into(),
            status,
            statements_applied: 0,
            failures: Vec::new(),
            error: None,
            statements: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn created(table: impl Into<String>) -> Self {
        Self::with_status(table, TableStatus::Created)
    }

    pub fn planned(table: impl Into<String>, statements: Vec<String>) -> Self {
        let mut result = Self::with_status(table, TableStatus::Planned);
        result.statements = statements;
        result
    }

    pub fn skipped(table: impl Into<String>) -> Self {
        Self::with_status(table, TableStatus::Skipped)
    }

    pub fn cancelled(table: impl Into<String>) -> Self {
        Self::with_status(table, TableStatus::Cancelled)
    }

    pub fn failed(table: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::with_status(table, TableStatus::Failed);
        result.error = Some(error.into());
        result
    }
}

/// Aggregated result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Unique run identifier.
    pub run_id: String,

    /// "completed", "completed_with_errors", or "cancelled".
    pub status: String,

    pub dry_run: bool,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    pub tables_total: usize,
    pub tables_created: usize,
    pub tables_planned: usize,
    pub tables_skipped: usize,
    pub tables_failed: usize,
    pub tables_cancelled: usize,

    /// Rejected constraint and index statements across all tables.
    pub statement_failures: usize,

    /// Tables whose creation failed.
    pub failed_tables: Vec<String>,

    /// Per-table results, sorted by table name.
    pub tables: Vec<TableResult>,
}

impl SyncReport {
    pub fn new(
        run_id: String,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        mut tables: Vec<TableResult>,
        dry_run: bool,
        cancelled: bool,
    ) -> Self {
        tables.sort_by(|a, b| a.table.cmp(&b.table));

        let count = |status: TableStatus| tables.iter().filter(|t| t.status == status).count();
        let tables_created = count(TableStatus::Created);
        let tables_planned = count(TableStatus::Planned);
        let tables_skipped = count(TableStatus::Skipped);
        let tables_failed = count(TableStatus::Failed);
        let tables_cancelled = count(TableStatus::Cancelled);

        let statement_failures = tables.iter().map(|t| t.failures.len()).sum();
        let failed_tables = tables
            .iter()
            .filter(|t| t.status == TableStatus::Failed)
            .map(|t| t.table.clone())
            .collect();

        let status = if cancelled {
            "cancelled"
        } else if tables_failed > 0 || statement_failures > 0 {
            "completed_with_errors"
        } else {
            "completed"
        };

        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        Self {
            run_id,
            status: status.to_string(),
            dry_run,
            started_at,
            completed_at,
            duration_seconds,
            tables_total: tables.len(),
            tables_created,
            tables_planned,
            tables_skipped,
            tables_failed,
            tables_cancelled,
            statement_failures,
            failed_tables,
            tables,
        }
    }

    /// Whether any table or statement failed.
    pub fn has_failures(&self) -> bool {
        self.tables_failed > 0 || self.statement_failures > 0
    }

    /// Look up one table's result.
    pub fn table(&self, name: &str) -> Option<&TableResult> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
