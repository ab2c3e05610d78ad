//! PostgreSQL target database operations.

use crate::config::TargetConfig;
use crate::core::{normalize_table_name, ExistingTableSet};
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{debug, info};

/// Trait for target database operations.
#[async_trait]
pub trait TargetPool: Send + Sync {
    /// Lower-cased names of the tables already in the target schema.
    async fn existing_tables(&self) -> Result<ExistingTableSet>;

    /// Check out a connection for exclusive use by one work unit.
    async fn acquire(&self) -> Result<Box<dyn StatementExecutor>>;

    /// Round-trip a trivial query to prove the target is reachable.
    async fn ping(&self) -> Result<()> {
        self.existing_tables().await.map(|_| ())
    }

    /// Get the database type.
    fn db_type(&self) -> &str;
}

/// Statement execution over one exclusively held target connection.
#[async_trait]
pub trait StatementExecutor: Send {
    /// Execute one DDL statement.
    async fn execute(&mut self, sql: &str) -> Result<()>;
}

/// PostgreSQL target pool implementation.
pub struct PgPool {
    pool: Pool,
    schema: Option<String>,
}

impl PgPool {
    /// Create a new PostgreSQL target pool.
    pub async fn new(config: &TargetConfig, max_conns: usize) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("schema-convert");

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(max_conns)
            .build()
            .map_err(|e| ConvertError::pool(e.to_string(), "creating PostgreSQL pool"))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| ConvertError::pool(e.to_string(), "testing PostgreSQL connection"))?;

        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to PostgreSQL: {}:{}/{} (pool_size={})",
            config.host, config.port, config.database, max_conns
        );

        Ok(Self {
            pool,
            schema: config.schema.clone(),
        })
    }

    async fn get_client(&self) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| ConvertError::pool(e.to_string(), "getting PostgreSQL connection"))
    }
}

#[async_trait]
impl TargetPool for PgPool {
    async fn existing_tables(&self) -> Result<ExistingTableSet> {
        let client = self.get_client().await?;

        let rows = client
            .query(
                "SELECT table_name::text FROM information_schema.tables
                 WHERE table_schema = COALESCE($1::text, current_schema())
                   AND table_type = 'BASE TABLE'",
                &[&self.schema],
            )
            .await?;

        let tables: ExistingTableSet = rows
            .iter()
            .map(|row| normalize_table_name(row.get::<_, &str>(0)))
            .collect();

        debug!("Target already has {} tables", tables.len());
        Ok(tables)
    }

    async fn acquire(&self) -> Result<Box<dyn StatementExecutor>> {
        let client = self.get_client().await?;

        if let Some(schema) = &self.schema {
            client
                .batch_execute(&format!(
                    "SET search_path TO {}",
                    crate::core::quote_pg(schema)
                ))
                .await?;
        }

        Ok(Box::new(PgExecutor { client }))
    }

    async fn ping(&self) -> Result<()> {
        let client = self.get_client().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "postgres"
    }
}

/// Target connection held by one work unit.
struct PgExecutor {
    client: Object,
}

#[async_trait]
impl StatementExecutor for PgExecutor {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}
