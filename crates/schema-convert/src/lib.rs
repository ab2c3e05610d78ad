//! # schema-convert
//!
//! MSSQL to PostgreSQL schema conversion library.
//!
//! Reads table definitions from a SQL Server schema and recreates them in
//! PostgreSQL:
//!
//! - **Type mapping** from MSSQL column types to PostgreSQL types
//! - **Identifier escaping** for target reserved words
//! - **Constraints and indexes**: primary keys, foreign keys, unique
//!   constraints, and secondary indexes
//! - **Parallel conversion** with one work unit per table
//! - **Idempotent re-runs**: tables already present in the target are skipped
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_convert::{Config, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> schema_convert::Result<()> {
//!     let config = Config::load("config.yaml")?.with_auto_tuning();
//!     let orchestrator = Orchestrator::new(config).await?;
//!     let report = orchestrator.run(CancellationToken::new()).await?;
//!     println!("Created {} tables", report.tables_created);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod ddl;
pub mod error;
pub mod orchestrator;
pub mod source;
pub mod target;
pub mod typemap;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, SourceConfig, TableFilter, TargetConfig};
pub use core::{Column, ReservedWords, Table, TableMetadata};
pub use ddl::{Statement, StatementKind};
pub use error::{ConvertError, Result};
pub use orchestrator::{
    HealthCheckResult, Orchestrator, StatementFailure, SyncReport, TableResult, TableStatus,
};
pub use source::{MssqlPool, SchemaReader, SourcePool};
pub use target::{PgPool, StatementExecutor, TargetPool};
