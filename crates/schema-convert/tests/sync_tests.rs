//! Orchestration tests against in-memory source and target pools.

use async_trait::async_trait;
use schema_convert::core::{ExistingTableSet, ForeignKeyColumn, Index, KeyColumn, KeyType};
use schema_convert::{
    Column, Config, ConvertError, Orchestrator, Result, SchemaReader, SourcePool,
    StatementExecutor, StatementKind, TableStatus, TargetPool,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Mock source
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct MockTable {
    columns: Vec<Column>,
    key_columns: Vec<KeyColumn>,
    foreign_keys: Vec<ForeignKeyColumn>,
    indexes: Vec<Index>,
    fail_metadata: bool,
    panic_on_read: bool,
    /// Cancelled once this table's columns are read.
    cancel_on_read: Option<CancellationToken>,
}

impl MockTable {
    fn with_columns(columns: &[(&str, &str, bool)]) -> Self {
        Self {
            columns: columns
                .iter()
                .enumerate()
                .map(|(i, (name, ty, nullable))| Column {
                    ordinal_pos: i as i32 + 1,
                    ..Column::new(*name, *ty, *nullable)
                })
                .collect(),
            ..Default::default()
        }
    }

    fn primary_key(mut self, name: &str, column: &str) -> Self {
        self.key_columns.push(KeyColumn {
            constraint_name: name.to_string(),
            key_type: KeyType::PrimaryKey,
            column_name: column.to_string(),
            ordinal: 1,
        });
        self
    }

    fn foreign_key(mut self, name: &str, column: &str, ref_table: &str, ref_column: &str) -> Self {
        self.foreign_keys.push(ForeignKeyColumn {
            constraint_name: name.to_string(),
            column_name: column.to_string(),
            ref_table: ref_table.to_string(),
            ref_column: ref_column.to_string(),
            ordinal: 1,
        });
        self
    }

    fn index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.push(Index {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            is_unique: false,
        });
        self
    }
}

struct MockSource {
    tables: Arc<Vec<(String, MockTable)>>,
}

impl MockSource {
    fn new(tables: Vec<(&str, MockTable)>) -> Self {
        Self {
            tables: Arc::new(
                tables
                    .into_iter()
                    .map(|(name, table)| (name.to_string(), table))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SourcePool for MockSource {
    async fn list_tables(&self, _schema: &str) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn acquire(&self) -> Result<Box<dyn SchemaReader>> {
        Ok(Box::new(MockReader {
            tables: self.tables.clone(),
        }))
    }

    fn db_type(&self) -> &str {
        "mock-mssql"
    }
}

struct MockReader {
    tables: Arc<Vec<(String, MockTable)>>,
}

impl MockReader {
    fn table(&self, name: &str) -> Result<&MockTable> {
        let table = self
            .tables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
            .ok_or_else(|| ConvertError::metadata(name, "no such table"))?;
        if table.panic_on_read {
            panic!("reader crashed on {}", name);
        }
        if table.fail_metadata {
            return Err(ConvertError::metadata(name, "query timed out"));
        }
        Ok(table)
    }
}

#[async_trait]
impl SchemaReader for MockReader {
    async fn load_columns(&mut self, _schema: &str, table: &str) -> Result<Vec<Column>> {
        let table = self.table(table)?;
        if let Some(token) = &table.cancel_on_read {
            token.cancel();
        }
        Ok(table.columns.clone())
    }

    async fn load_key_columns(&mut self, _schema: &str, table: &str) -> Result<Vec<KeyColumn>> {
        Ok(self.table(table)?.key_columns.clone())
    }

    async fn load_foreign_keys(
        &mut self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyColumn>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn load_indexes(&mut self, _schema: &str, table: &str) -> Result<Vec<Index>> {
        Ok(self.table(table)?.indexes.clone())
    }
}

// ---------------------------------------------------------------------------
// Mock target
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TargetState {
    tables: HashSet<String>,
    executed: Vec<String>,
}

/// Records executed SQL. A foreign key fails unless its referenced table was
/// created first; statements containing a configured fragment always fail.
#[derive(Clone, Default)]
struct MockTarget {
    state: Arc<Mutex<TargetState>>,
    fail_on: Arc<Vec<String>>,
}

impl MockTarget {
    fn with_existing(tables: &[&str]) -> Self {
        let target = Self::default();
        target
            .state
            .lock()
            .unwrap()
            .tables
            .extend(tables.iter().map(|t| t.to_string()));
        target
    }

    fn failing_on(fragments: &[&str]) -> Self {
        Self {
            fail_on: Arc::new(fragments.iter().map(|f| f.to_string()).collect()),
            ..Default::default()
        }
    }

    fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    fn create_count(&self) -> usize {
        self.executed()
            .iter()
            .filter(|sql| sql.starts_with("CREATE TABLE"))
            .count()
    }
}

fn token_after<'a>(sql: &'a str, marker: &str) -> Option<&'a str> {
    sql.split_once(marker)
        .and_then(|(_, rest)| rest.split_whitespace().next())
}

#[async_trait]
impl TargetPool for MockTarget {
    async fn existing_tables(&self) -> Result<ExistingTableSet> {
        Ok(self.state.lock().unwrap().tables.clone())
    }

    async fn acquire(&self) -> Result<Box<dyn StatementExecutor>> {
        Ok(Box::new(self.clone()))
    }

    fn db_type(&self) -> &str {
        "mock-postgres"
    }
}

#[async_trait]
impl StatementExecutor for MockTarget {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if self.fail_on.iter().any(|f| sql.contains(f.as_str())) {
            return Err(ConvertError::Config(format!("rejected: {}", sql)));
        }
        if let Some(referenced) = token_after(sql, " REFERENCES ") {
            if !state.tables.contains(referenced) {
                return Err(ConvertError::Config(format!(
                    "relation \"{}\" does not exist",
                    referenced
                )));
            }
        }
        if let Some(created) = token_after(sql, "CREATE TABLE ") {
            state.tables.insert(created.to_string());
        }
        state.executed.push(sql.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(workers: usize, defer_foreign_keys: bool) -> Config {
    let mut config = Config::from_yaml(
        r#"
source:
  host: mssql.test
  database: Sales
  user: sa
target:
  host: pg.test
  database: sales
  user: postgres
"#,
    )
    .unwrap();
    config.migration.workers = Some(workers);
    config.migration.defer_foreign_keys = defer_foreign_keys;
    config
}

fn orchestrator(config: Config, source: MockSource, target: &MockTarget) -> Orchestrator {
    Orchestrator::with_pools(config, Arc::new(source), Arc::new(target.clone())).unwrap()
}

/// `Orders` references `Customers` and is listed first, so it is created
/// before its referenced table when run with one worker.
fn orders_and_customers() -> MockSource {
    MockSource::new(vec![
        (
            "Orders",
            MockTable::with_columns(&[("id", "int", false), ("customer_id", "int", false)])
                .primary_key("pk_orders", "id")
                .foreign_key("fk_orders_customers", "customer_id", "Customers", "id")
                .index("ix_orders_customer", &["customer_id"]),
        ),
        (
            "Customers",
            MockTable::with_columns(&[("id", "int", false), ("name", "nvarchar", true)])
                .primary_key("pk_customers", "id"),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_creates_tables_and_constraints() {
    let target = MockTarget::default();
    let report = orchestrator(config(2, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, "completed");
    assert_eq!(report.tables_created, 2);
    assert_eq!(report.statement_failures, 0);

    let executed = target.executed();
    assert!(executed.contains(
        &"CREATE TABLE customers (id int NOT NULL, name varchar NULL);".to_string()
    ));
    assert!(executed.contains(
        &"ALTER TABLE orders ADD CONSTRAINT fk_orders_customers FOREIGN KEY (customer_id) REFERENCES customers (id);"
            .to_string()
    ));

    let orders = report.table("orders").unwrap();
    // CREATE TABLE + PK + index + deferred FK
    assert_eq!(orders.statements_applied, 4);
}

#[tokio::test]
async fn test_rerun_skips_existing_tables() {
    let target = MockTarget::default();
    let first = orchestrator(config(2, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.tables_created, 2);
    let creates_after_first = target.create_count();

    let second = orchestrator(config(2, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(second.tables_skipped, 2);
    assert_eq!(second.tables_created, 0);
    assert_eq!(target.create_count(), creates_after_first);
}

#[tokio::test]
async fn test_existing_table_matched_case_insensitively() {
    let target = MockTarget::with_existing(&["customers"]);
    let report = orchestrator(config(1, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.table("customers").unwrap().status, TableStatus::Skipped);
    assert_eq!(report.table("orders").unwrap().status, TableStatus::Created);
    assert!(!target
        .executed()
        .iter()
        .any(|sql| sql.starts_with("CREATE TABLE customers")));
}

#[tokio::test]
async fn test_inline_foreign_key_fails_on_forward_reference() {
    let target = MockTarget::default();
    let report = orchestrator(config(1, false), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, "completed_with_errors");
    assert_eq!(report.tables_created, 2);

    let orders = report.table("orders").unwrap();
    assert_eq!(orders.failures.len(), 1);
    assert_eq!(orders.failures[0].kind, StatementKind::ForeignKey);
    assert_eq!(orders.failures[0].object, "fk_orders_customers");
    assert!(orders.failures[0].error.contains("does not exist"));

    // The index after the failed foreign key still ran.
    assert!(target
        .executed()
        .iter()
        .any(|sql| sql.starts_with("CREATE INDEX ix_orders_customer")));
}

#[tokio::test]
async fn test_inline_foreign_key_failure_does_not_affect_other_tables() {
    let source = MockSource::new(vec![
        (
            "Orders",
            MockTable::with_columns(&[("id", "int", false), ("missing_id", "int", true)])
                .primary_key("pk_orders", "id")
                .foreign_key("fk_orders_missing", "missing_id", "Missing", "id"),
        ),
        (
            "Customers",
            MockTable::with_columns(&[("id", "int", false)]).primary_key("pk_customers", "id"),
        ),
    ]);
    let target = MockTarget::default();

    let report = orchestrator(config(2, false), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, "completed_with_errors");
    assert_eq!(report.tables_created, 2);
    assert_eq!(report.tables_failed, 0);
    assert_eq!(report.statement_failures, 1);

    let orders = report.table("orders").unwrap();
    assert_eq!(orders.failures.len(), 1);
    assert_eq!(orders.failures[0].object, "fk_orders_missing");
    assert!(orders.failures[0].error.contains("\"missing\" does not exist"));

    let customers = report.table("customers").unwrap();
    assert_eq!(customers.status, TableStatus::Created);
    assert!(customers.failures.is_empty());
    assert_eq!(customers.statements_applied, 2);
    assert!(target.executed().contains(
        &"ALTER TABLE customers ADD CONSTRAINT pk_customers PRIMARY KEY (id);".to_string()
    ));
}

#[tokio::test]
async fn test_deferred_foreign_keys_run_after_all_tables() {
    let target = MockTarget::default();
    let report = orchestrator(config(1, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.has_failures());

    let executed = target.executed();
    let fk_pos = executed
        .iter()
        .position(|sql| sql.contains("FOREIGN KEY"))
        .unwrap();
    let last_create = executed
        .iter()
        .rposition(|sql| sql.starts_with("CREATE TABLE"))
        .unwrap();
    assert!(fk_pos > last_create);
}

#[tokio::test]
async fn test_statement_failure_is_isolated() {
    let target = MockTarget::failing_on(&["pk_orders"]);
    let report = orchestrator(config(2, true), orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let orders = report.table("orders").unwrap();
    assert_eq!(orders.status, TableStatus::Created);
    assert_eq!(orders.failures.len(), 1);
    assert_eq!(orders.failures[0].kind, StatementKind::PrimaryKey);
    assert!(orders.failures[0]
        .error
        .starts_with("PRIMARY KEY pk_orders failed"));

    let customers = report.table("customers").unwrap();
    assert!(customers.failures.is_empty());
    assert!(target
        .executed()
        .iter()
        .any(|sql| sql.contains("pk_customers")));
    assert_eq!(report.tables_failed, 0);
}

#[tokio::test]
async fn test_unrenderable_index_name_is_a_statement_failure() {
    let long_name = "é".repeat(65);
    let source = MockSource::new(vec![(
        "Orders",
        MockTable::with_columns(&[("id", "int", false), ("order_date", "datetime", true)])
            .primary_key("pk_orders", "id")
            .index(&long_name, &["order_date"])
            .index("ix_orders_id_date", &["id", "order_date"]),
    )]);
    let target = MockTarget::default();

    let report = orchestrator(config(1, true), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.status, "completed_with_errors");
    assert_eq!(report.tables_failed, 0);

    let orders = report.table("orders").unwrap();
    assert_eq!(orders.status, TableStatus::Created);
    assert!(orders.error.is_none());
    // CREATE TABLE + PK + the other index
    assert_eq!(orders.statements_applied, 3);

    assert_eq!(orders.failures.len(), 1);
    let failure = &orders.failures[0];
    assert_eq!(failure.kind, StatementKind::Index);
    assert_eq!(failure.object, long_name);
    assert!(failure.sql.is_empty());
    assert!(failure.error.starts_with("INDEX "));
    assert!(failure.error.contains("maximum length"));
    assert!(!failure.error.contains("Configuration error"));

    let executed = target.executed();
    assert!(executed[0].starts_with("CREATE TABLE orders"));
    assert!(executed.contains(
        &"ALTER TABLE orders ADD CONSTRAINT pk_orders PRIMARY KEY (id);".to_string()
    ));
    assert!(executed
        .iter()
        .any(|sql| sql.starts_with("CREATE INDEX ix_orders_id_date")));
}

#[tokio::test]
async fn test_create_table_failure_lists_unmapped_types() {
    let source = MockSource::new(vec![
        (
            "Shapes",
            MockTable::with_columns(&[("id", "int", false), ("active", "bit", true)])
                .primary_key("pk_shapes", "id"),
        ),
        ("Colors", MockTable::with_columns(&[("id", "int", false)])),
    ]);
    let target = MockTarget::failing_on(&["CREATE TABLE shapes"]);

    let report = orchestrator(config(2, true), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let shapes = report.table("shapes").unwrap();
    assert_eq!(shapes.status, TableStatus::Failed);
    let error = shapes.error.as_deref().unwrap();
    assert!(error.starts_with("CREATE TABLE shapes failed"));
    assert!(error.contains("active: bit"));
    assert_eq!(report.failed_tables, vec!["shapes".to_string()]);

    // No constraints were attempted for the failed table.
    assert!(!target.executed().iter().any(|sql| sql.contains("pk_shapes")));
    assert_eq!(report.table("colors").unwrap().status, TableStatus::Created);
}

#[tokio::test]
async fn test_metadata_failure_is_isolated() {
    let mut broken = MockTable::with_columns(&[("id", "int", false)]);
    broken.fail_metadata = true;
    let source = MockSource::new(vec![
        ("Broken", broken),
        ("Fine", MockTable::with_columns(&[("id", "int", false)])),
    ]);
    let target = MockTarget::default();

    let report = orchestrator(config(2, true), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let broken = report.table("broken").unwrap();
    assert_eq!(broken.status, TableStatus::Failed);
    assert!(broken.error.as_deref().unwrap().contains("query timed out"));
    assert_eq!(report.table("fine").unwrap().status, TableStatus::Created);
    assert_eq!(target.create_count(), 1);
}

#[tokio::test]
async fn test_empty_table_is_reported_failed() {
    let source = MockSource::new(vec![("Empty", MockTable::default())]);
    let target = MockTarget::default();

    let report = orchestrator(config(1, true), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let empty = report.table("empty").unwrap();
    assert_eq!(empty.status, TableStatus::Failed);
    assert!(empty.error.as_deref().unwrap().contains("has no columns"));
    assert!(target.executed().is_empty());
}

#[tokio::test]
async fn test_panicking_unit_is_reported_failed() {
    let mut crashing = MockTable::with_columns(&[("id", "int", false)]);
    crashing.panic_on_read = true;
    let source = MockSource::new(vec![
        ("Crashing", crashing),
        ("Fine", MockTable::with_columns(&[("id", "int", false)])),
    ]);
    let target = MockTarget::default();

    let report = orchestrator(config(2, true), source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let crashing = report.table("crashing").unwrap();
    assert_eq!(crashing.status, TableStatus::Failed);
    assert!(crashing.error.as_deref().unwrap().contains("panicked"));
    assert_eq!(report.table("fine").unwrap().status, TableStatus::Created);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let target = MockTarget::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = orchestrator(config(2, true), orders_and_customers(), &target)
        .run(cancel)
        .await
        .unwrap();

    assert_eq!(report.status, "cancelled");
    assert_eq!(report.tables_cancelled, 2);
    assert!(target.executed().is_empty());
}

#[tokio::test]
async fn test_cancel_mid_run_finishes_started_tables() {
    let cancel = CancellationToken::new();
    let mut orders = MockTable::with_columns(&[("id", "int", false), ("customer_id", "int", false)])
        .primary_key("pk_orders", "id")
        .foreign_key("fk_orders_customers", "customer_id", "Customers", "id");
    orders.cancel_on_read = Some(cancel.clone());

    let source = MockSource::new(vec![
        ("Orders", orders),
        ("Invoices", MockTable::with_columns(&[("id", "int", false)])),
        ("Products", MockTable::with_columns(&[("id", "int", false)])),
    ]);
    let target = MockTarget::with_existing(&["customers"]);

    let report = orchestrator(config(1, true), source, &target)
        .run(cancel)
        .await
        .unwrap();

    assert_eq!(report.status, "cancelled");
    assert_eq!(report.tables_created, 1);
    assert_eq!(report.tables_cancelled, 2);
    assert_eq!(report.table("invoices").unwrap().status, TableStatus::Cancelled);
    assert_eq!(report.table("products").unwrap().status, TableStatus::Cancelled);

    // The started table ran to completion, deferred foreign key included.
    let orders = report.table("orders").unwrap();
    assert_eq!(orders.status, TableStatus::Created);
    assert!(orders.failures.is_empty());
    assert_eq!(orders.statements_applied, 3);

    let executed = target.executed();
    assert_eq!(executed.len(), 3);
    assert!(executed[2].contains("FOREIGN KEY"));
    assert_eq!(target.create_count(), 1);
}

#[tokio::test]
async fn test_dry_run_performs_no_writes() {
    let target = MockTarget::default();
    let report = orchestrator(config(2, true), orders_and_customers(), &target)
        .with_dry_run(true)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(target.executed().is_empty());
    assert!(report.dry_run);
    assert_eq!(report.tables_planned, 2);

    let orders = report.table("orders").unwrap();
    assert_eq!(orders.status, TableStatus::Planned);
    assert!(orders.statements[0].starts_with("CREATE TABLE orders"));
    assert!(orders.statements.last().unwrap().contains("FOREIGN KEY"));
}

#[tokio::test]
async fn test_dry_run_lists_unrenderable_objects() {
    let source = MockSource::new(vec![(
        "Orders",
        MockTable::with_columns(&[("id", "int", false)])
            .primary_key("pk_orders", "id")
            .index("", &["id"]),
    )]);
    let target = MockTarget::default();

    let report = orchestrator(config(1, true), source, &target)
        .with_dry_run(true)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(target.executed().is_empty());
    let orders = report.table("orders").unwrap();
    assert_eq!(orders.status, TableStatus::Planned);
    assert_eq!(orders.statements.len(), 2);
    assert_eq!(orders.failures.len(), 1);
    assert!(orders.failures[0].error.contains("cannot be empty"));
}

#[tokio::test]
async fn test_disabled_kinds_are_not_planned() {
    let mut config = config(1, true);
    config.migration.create_indexes = false;
    config.migration.create_foreign_keys = false;
    let target = MockTarget::default();

    let report = orchestrator(config, orders_and_customers(), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.has_failures());
    let executed = target.executed();
    assert!(!executed.iter().any(|sql| sql.contains("FOREIGN KEY")));
    assert!(!executed.iter().any(|sql| sql.starts_with("CREATE INDEX")));
    assert!(executed.iter().any(|sql| sql.contains("PRIMARY KEY")));
}

#[tokio::test]
async fn test_table_filter_applies_before_conversion() {
    let mut config = config(2, true);
    config.migration.include_tables = vec!["order*".to_string(), "customers".to_string()];
    config.migration.exclude_tables = vec!["*_archive".to_string()];

    let tables = vec![
        ("Orders", MockTable::with_columns(&[("id", "int", false)])),
        ("Orders_Archive", MockTable::with_columns(&[("id", "int", false)])),
        ("Customers", MockTable::with_columns(&[("id", "int", false)])),
        ("Products", MockTable::with_columns(&[("id", "int", false)])),
    ];
    let target = MockTarget::default();

    let report = orchestrator(config, MockSource::new(tables), &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let names: HashSet<_> = report.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, HashSet::from(["orders", "customers"]));
}

#[tokio::test]
async fn test_reserved_words_from_config_are_quoted() {
    let mut config = config(1, true);
    config.migration.reserved_words = vec!["user".to_string()];
    let source = MockSource::new(vec![(
        "Logins",
        MockTable::with_columns(&[("user", "nvarchar", false), ("offset", "int", true)]),
    )]);
    let target = MockTarget::default();

    orchestrator(config, source, &target)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        target.executed(),
        vec![
            "CREATE TABLE logins (\"user\" varchar NOT NULL, \"offset\" int NULL);".to_string()
        ]
    );
}

#[tokio::test]
async fn test_health_check_reports_both_sides() {
    let target = MockTarget::default();
    let result = orchestrator(config(1, true), orders_and_customers(), &target)
        .health_check()
        .await
        .unwrap();

    assert!(result.healthy);
    assert!(result.source_connected);
    assert!(result.target_connected);
    assert!(result.source_error.is_none());
}
