//! Schema conversion orchestrator - main workflow coordinator.

mod report;

pub use report::{StatementFailure, SyncReport, TableResult, TableStatus};

use crate::config::{Config, MigrationConfig, TableFilter};
use crate::core::{normalize_table_name, ReservedWords, Table};
use crate::ddl::{build_create_table, plan_constraints, Statement, StatementKind};
use crate::error::{ConvertError, Result};
use crate::source::{MssqlPool, SourcePool};
use crate::target::{PgPool, StatementExecutor, TargetPool};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Schema conversion orchestrator.
pub struct Orchestrator {
    config: Config,
    source: Arc<dyn SourcePool>,
    target: Arc<dyn TargetPool>,
    reserved: Arc<ReservedWords>,
    filter: TableFilter,
    dry_run: bool,
}

/// Result of a connectivity check against both databases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
    pub healthy: bool,
}

/// Read-only state shared by every work unit of a run.
struct UnitContext {
    source: Arc<dyn SourcePool>,
    target: Arc<dyn TargetPool>,
    reserved: Arc<ReservedWords>,
    source_schema: String,
    migration: MigrationConfig,
    dry_run: bool,
    cancel: CancellationToken,
}

/// What a work unit hands back to the orchestrator.
struct UnitOutcome {
    result: TableResult,
    /// Foreign keys held for the second pass.
    deferred: Vec<Statement>,
}

impl UnitOutcome {
    fn done(result: TableResult) -> Self {
        Self {
            result,
            deferred: Vec::new(),
        }
    }
}

impl Orchestrator {
    /// Create a new orchestrator connected to the configured databases.
    pub async fn new(config: Config) -> Result<Self> {
        let pool_size = config.migration.get_pool_size();
        let source = MssqlPool::with_max_connections(config.source.clone(), pool_size as u32).await?;
        let target = PgPool::new(&config.target, pool_size).await?;

        Self::with_pools(config, Arc::new(source), Arc::new(target))
    }

    /// Create an orchestrator over already constructed pools.
    pub fn with_pools(
        config: Config,
        source: Arc<dyn SourcePool>,
        target: Arc<dyn TargetPool>,
    ) -> Result<Self> {
        let reserved = Arc::new(ReservedWords::with_extra(&config.migration.reserved_words));
        let filter = config.table_filter()?;

        Ok(Self {
            config,
            source,
            target,
            reserved,
            filter,
            dry_run: false,
        })
    }

    /// Plan statements without executing anything against the target.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the schema conversion.
    pub async fn run(&self, cancel: CancellationToken) -> Result<SyncReport> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let migration = &self.config.migration;

        info!("Starting schema conversion run: {}", run_id);
        info!(
            "Source: {} schema '{}', target: {} schema '{}'",
            self.source.db_type(),
            self.config.source.schema,
            self.target.db_type(),
            self.config.target.schema.as_deref().unwrap_or("<current>")
        );
        if migration.defer_foreign_keys {
            info!("Foreign keys: deferred until all tables exist");
        } else {
            info!("Foreign keys: inline (may fail when the referenced table is created later)");
        }
        if self.dry_run {
            info!("Dry run: no statements will be executed");
        }

        // Phase 1: snapshot the target once
        let existing = self.target.existing_tables().await?;

        // Phase 2: enumerate source tables
        let tables: Vec<String> = self
            .source
            .list_tables(&self.config.source.schema)
            .await?
            .into_iter()
            .filter(|name| {
                let keep = self.filter.matches(name);
                if !keep {
                    debug!("{}: filtered out", name);
                }
                keep
            })
            .collect();

        // Phase 3: one work unit per new table
        let workers = migration.get_workers();
        let semaphore = Arc::new(Semaphore::new(workers));
        let ctx = Arc::new(UnitContext {
            source: self.source.clone(),
            target: self.target.clone(),
            reserved: self.reserved.clone(),
            source_schema: self.config.source.schema.clone(),
            migration: migration.clone(),
            dry_run: self.dry_run,
            cancel: cancel.clone(),
        });

        info!("Converting {} tables with {} workers", tables.len(), workers);

        let mut results = Vec::with_capacity(tables.len());
        let mut handles = Vec::new();

        for source_name in tables {
            let table_name = normalize_table_name(&source_name);
            if existing.contains(&table_name) {
                info!("{}: already exists in target, skipping", table_name);
                results.push(TableResult::skipped(table_name));
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                debug!("{}: cancelled before start", table_name);
                results.push(TableResult::cancelled(table_name));
                continue;
            };

            let ctx = ctx.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                run_unit(&ctx, &source_name).await
            });

            handles.push((table_name, handle));
        }

        // Collect results
        let mut deferred = Vec::new();
        for (table_name, handle) in handles {
            match handle.await {
                Ok(outcome) => {
                    if !outcome.deferred.is_empty() {
                        deferred.push((results.len(), outcome.deferred));
                    }
                    results.push(outcome.result);
                }
                Err(e) => {
                    error!("{}: work unit panicked: {}", table_name, e);
                    results.push(TableResult::failed(
                        table_name,
                        format!("work unit panicked: {}", e),
                    ));
                }
            }
        }

        // Phase 4: foreign keys once every table exists
        if !deferred.is_empty() {
            self.apply_deferred(&mut results, deferred).await;
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!("Run cancelled; unstarted tables were not converted");
        }

        let report = SyncReport::new(
            run_id,
            started_at,
            Utc::now(),
            results,
            self.dry_run,
            cancelled,
        );

        info!(
            "Schema conversion {}: {} created, {} planned, {} skipped, {} failed, {} cancelled, {} statement failures in {:.1}s",
            report.status,
            report.tables_created,
            report.tables_planned,
            report.tables_skipped,
            report.tables_failed,
            report.tables_cancelled,
            report.statement_failures,
            report.duration_seconds
        );

        Ok(report)
    }

    /// Apply held foreign keys on one target connection, attributing each
    /// outcome to the table that owns the constraint.
    async fn apply_deferred(
        &self,
        results: &mut [TableResult],
        deferred: Vec<(usize, Vec<Statement>)>,
    ) {
        let total: usize = deferred.iter().map(|(_, stmts)| stmts.len()).sum();
        info!("Applying {} deferred foreign keys", total);

        let mut executor = match self.target.acquire().await {
            Ok(executor) => executor,
            Err(e) => {
                error!("Could not acquire target connection for foreign keys: {}", e);
                let message = e.message_chain();
                for (idx, statements) in deferred {
                    for statement in &statements {
                        let err = ConvertError::statement(
                            statement.kind,
                            &statement.object,
                            message.clone(),
                        );
                        results[idx]
                            .failures
                            .push(StatementFailure::new(statement, err.to_string()));
                    }
                }
                return;
            }
        };

        for (idx, statements) in deferred {
            for statement in &statements {
                apply_statement(executor.as_mut(), statement, &mut results[idx]).await;
            }
        }
    }

    /// Check connectivity and latency of both databases.
    pub async fn health_check(&self) -> Result<HealthCheckResult> {
        let start = Instant::now();
        let source = self.source.ping().await;
        let source_latency_ms = start.elapsed().as_millis() as u64;

        let start = Instant::now();
        let target = self.target.ping().await;
        let target_latency_ms = start.elapsed().as_millis() as u64;

        let result = HealthCheckResult {
            source_connected: source.is_ok(),
            source_latency_ms,
            source_error: source.err().map(|e| e.message_chain()),
            target_connected: target.is_ok(),
            target_latency_ms,
            target_error: target.err().map(|e| e.message_chain()),
            healthy: false,
        };

        Ok(HealthCheckResult {
            healthy: result.source_connected && result.target_connected,
            ..result
        })
    }
}

impl HealthCheckResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Whether statements of this kind are enabled.
fn creates(migration: &MigrationConfig, kind: StatementKind) -> bool {
    match kind {
        StatementKind::CreateTable => true,
        StatementKind::PrimaryKey => migration.create_primary_keys,
        StatementKind::ForeignKey => migration.create_foreign_keys,
        StatementKind::Unique => migration.create_unique_constraints,
        StatementKind::Index => migration.create_indexes,
    }
}

/// Convert one table. Never fails: errors become a `Failed` result.
async fn run_unit(ctx: &UnitContext, source_name: &str) -> UnitOutcome {
    let table_name = normalize_table_name(source_name);
    if ctx.cancel.is_cancelled() {
        debug!("{}: cancelled before start", table_name);
        return UnitOutcome::done(TableResult::cancelled(table_name));
    }

    let start = Instant::now();
    let mut outcome = match convert_table(ctx, source_name).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}: {}", table_name, e);
            UnitOutcome::done(TableResult::failed(table_name, e.message_chain()))
        }
    };
    outcome.result.duration_ms = start.elapsed().as_millis() as u64;
    outcome
}

async fn convert_table(ctx: &UnitContext, source_name: &str) -> Result<UnitOutcome> {
    let mut reader = ctx.source.acquire().await?;
    let columns = reader.load_columns(&ctx.source_schema, source_name).await?;
    let metadata = reader.load_metadata(&ctx.source_schema, source_name).await?;

    let table = Table::new(source_name, columns);
    let create = build_create_table(&table, &ctx.reserved)?;

    let mut plan = plan_constraints(&table, &metadata, &ctx.reserved)?;
    plan.retain_kinds(|kind| creates(&ctx.migration, kind));
    let rejected: Vec<StatementFailure> =
        plan.rejected.iter().map(StatementFailure::rejected).collect();
    let mut planned = plan.statements;

    let deferred = if ctx.migration.defer_foreign_keys {
        let (fks, rest): (Vec<Statement>, Vec<Statement>) = planned
            .into_iter()
            .partition(|s| s.kind == StatementKind::ForeignKey);
        planned = rest;
        fks
    } else {
        Vec::new()
    };

    if ctx.dry_run {
        let statements: Vec<String> = std::iter::once(&create)
            .chain(&planned)
            .chain(&deferred)
            .map(|s| s.sql.clone())
            .collect();
        info!("{}: planned {} statements", table.name, statements.len());
        let mut result = TableResult::planned(&table.name, statements);
        result.failures = rejected;
        return Ok(UnitOutcome::done(result));
    }

    let mut executor = ctx.target.acquire().await?;

    debug!("{}: {}", table.name, create.sql);
    if let Err(e) = executor.execute(&create.sql).await {
        let mut message = e.message_chain();
        if !create.unmapped_types.is_empty() {
            message.push_str(&format!(
                " (unmapped source types: {})",
                create.unmapped_types.join(", ")
            ));
        }
        return Err(ConvertError::statement(
            StatementKind::CreateTable,
            &table.name,
            message,
        ));
    }

    info!("{}: created ({} columns)", table.name, table.columns.len());

    let mut result = TableResult::created(&table.name);
    result.statements_applied = 1;
    result.failures = rejected;
    for statement in &planned {
        apply_statement(executor.as_mut(), statement, &mut result).await;
    }

    if !result.failures.is_empty() {
        warn!(
            "{}: {} constraints/indexes not created",
            table.name,
            result.failures.len()
        );
    }

    Ok(UnitOutcome { result, deferred })
}

/// Execute one statement, recording success or failure on `result`.
async fn apply_statement(
    executor: &mut dyn StatementExecutor,
    statement: &Statement,
    result: &mut TableResult,
) {
    debug!("{}: {}", statement.table, statement.sql);
    match executor.execute(&statement.sql).await {
        Ok(()) => result.statements_applied += 1,
        Err(e) => {
            let err = ConvertError::statement(statement.kind, &statement.object, e.message_chain());
            warn!("{}: {}", statement.table, err);
            result
                .failures
                .push(StatementFailure::new(statement, err.to_string()));
        }
    }
}
