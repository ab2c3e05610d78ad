//! MSSQL source database operations.

use crate::config::SourceConfig;
use crate::core::{Column, ForeignKeyColumn, Index, KeyColumn, KeyType, TableMetadata};
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

/// Trait for source database operations.
#[async_trait]
pub trait SourcePool: Send + Sync {
    /// List base table names in a schema.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Check out a connection for exclusive use by one work unit.
    async fn acquire(&self) -> Result<Box<dyn SchemaReader>>;

    /// Round-trip a trivial query to prove the source is reachable.
    async fn ping(&self) -> Result<()> {
        self.acquire().await.map(|_| ())
    }

    /// Get the database type.
    fn db_type(&self) -> &str;
}

/// Metadata reads over one exclusively held source connection.
#[async_trait]
pub trait SchemaReader: Send {
    /// Columns of a table in ordinal order.
    async fn load_columns(&mut self, schema: &str, table: &str) -> Result<Vec<Column>>;

    /// Primary key and unique constraint columns.
    async fn load_key_columns(&mut self, schema: &str, table: &str) -> Result<Vec<KeyColumn>>;

    /// Foreign key columns.
    async fn load_foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyColumn>>;

    /// Indexes not backing a primary key or unique constraint.
    async fn load_indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Index>>;

    /// Keys, foreign keys, and indexes in one call.
    async fn load_metadata(&mut self, schema: &str, table: &str) -> Result<TableMetadata> {
        Ok(TableMetadata {
            key_columns: self.load_key_columns(schema, table).await?,
            foreign_keys: self.load_foreign_keys(schema, table).await?,
            indexes: self.load_indexes(schema, table).await?,
        })
    }
}

/// Connection manager for bb8 pool with tiberius.
#[derive(Clone)]
struct TiberiusConnectionManager {
    config: SourceConfig,
}

impl TiberiusConnectionManager {
    fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        config.port(self.config.port);
        config.database(&self.config.database);
        config.authentication(AuthMethod::sql_server(&self.config.user, &self.config.password));

        match self.config.encrypt.to_lowercase().as_str() {
            "false" | "no" | "0" | "disable" => {
                config.encryption(EncryptionLevel::NotSupported);
            }
            _ => {
                if self.config.trust_server_cert {
                    config.trust_cert();
                }
                config.encryption(EncryptionLevel::Required);
            }
        }

        config
    }
}

#[async_trait]
impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = Client<Compat<TcpStream>>;
    type Error = tiberius::error::Error;

    async fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            })?;

        tcp.set_nodelay(true).ok();

        Client::connect(config, tcp.compat_write()).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// MSSQL source pool implementation with connection pooling.
pub struct MssqlPool {
    pool: Pool<TiberiusConnectionManager>,
}

impl MssqlPool {
    /// Create a new MSSQL source pool with specified max connections.
    pub async fn with_max_connections(config: SourceConfig, max_size: u32) -> Result<Self> {
        let manager = TiberiusConnectionManager::new(config.clone());
        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(1))
            .build(manager)
            .await
            .map_err(|e| ConvertError::pool(e.to_string(), "creating MSSQL pool"))?;

        // Test connection
        {
            let mut conn = pool
                .get()
                .await
                .map_err(|e| ConvertError::pool(e.to_string(), "testing MSSQL connection"))?;

            conn.simple_query("SELECT 1").await?.into_row().await?;
        }

        info!(
            "Connected to MSSQL: {}:{}/{} (pool_size={})",
            config.host, config.port, config.database, max_size
        );

        Ok(Self { pool })
    }

    /// Get a pooled connection.
    async fn get_client(&self) -> Result<PooledConnection<'_, TiberiusConnectionManager>> {
        self.pool
            .get()
            .await
            .map_err(|e| ConvertError::pool(e.to_string(), "getting MSSQL connection"))
    }
}

#[async_trait]
impl SourcePool for MssqlPool {
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let mut client = self.get_client().await?;

        let query = r#"
            SELECT t.TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES t
            WHERE t.TABLE_TYPE = 'BASE TABLE'
              AND t.TABLE_SCHEMA = @P1
            ORDER BY t.TABLE_NAME
        "#;

        let mut q = Query::new(query);
        q.bind(schema);

        let rows = q.query(&mut client).await?.into_first_result().await?;

        let tables: Vec<String> = rows
            .iter()
            .map(|row| row.get::<&str, _>(0).unwrap_or_default().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        info!("Found {} tables in source schema '{}'", tables.len(), schema);
        Ok(tables)
    }

    async fn acquire(&self) -> Result<Box<dyn SchemaReader>> {
        let conn = self
            .pool
            .get_owned()
            .await
            .map_err(|e| ConvertError::pool(e.to_string(), "checking out MSSQL connection"))?;
        Ok(Box::new(MssqlReader { conn }))
    }

    async fn ping(&self) -> Result<()> {
        let mut client = self.get_client().await?;
        client.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mssql"
    }
}

/// Source connection held by one work unit.
struct MssqlReader {
    conn: PooledConnection<'static, TiberiusConnectionManager>,
}

impl MssqlReader {
    async fn fetch(
        &mut self,
        sql: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<tiberius::Row>> {
        let mut q = Query::new(sql);
        q.bind(schema);
        q.bind(table);

        let client: &mut Client<Compat<TcpStream>> = &mut self.conn;
        let rows = q
            .query(client)
            .await
            .map_err(|e| ConvertError::metadata(table, e.to_string()))?
            .into_first_result()
            .await
            .map_err(|e| ConvertError::metadata(table, e.to_string()))?;
        Ok(rows)
    }
}

fn get_str(row: &tiberius::Row, idx: usize) -> String {
    row.get::<&str, _>(idx).unwrap_or_default().to_string()
}

#[async_trait]
impl SchemaReader for MssqlReader {
    async fn load_columns(&mut self, schema: &str, table: &str) -> Result<Vec<Column>> {
        let query = r#"
            SELECT
                COLUMN_NAME,
                DATA_TYPE,
                CASE WHEN IS_NULLABLE = 'YES' THEN 1 ELSE 0 END,
                ORDINAL_POSITION
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2
            ORDER BY ORDINAL_POSITION
        "#;

        let rows = self.fetch(query, schema, table).await?;
        let columns: Vec<Column> = rows
            .iter()
            .map(|row| Column {
                name: get_str(row, 0),
                data_type: get_str(row, 1),
                is_nullable: row.get::<i32, _>(2).unwrap_or(0) == 1,
                ordinal_pos: row.get::<i32, _>(3).unwrap_or(0),
            })
            .collect();

        debug!("Loaded {} columns for {}.{}", columns.len(), schema, table);
        Ok(columns)
    }

    async fn load_key_columns(&mut self, schema: &str, table: &str) -> Result<Vec<KeyColumn>> {
        let query = r#"
            SELECT
                tc.CONSTRAINT_NAME,
                tc.CONSTRAINT_TYPE,
                kcu.COLUMN_NAME,
                kcu.ORDINAL_POSITION
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
                AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
                AND kcu.TABLE_NAME = tc.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE IN ('PRIMARY KEY', 'UNIQUE')
              AND tc.TABLE_SCHEMA = @P1
              AND tc.TABLE_NAME = @P2
            ORDER BY tc.CONSTRAINT_TYPE, tc.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
        "#;

        let rows = self.fetch(query, schema, table).await?;
        let keys: Vec<KeyColumn> = rows
            .iter()
            .map(|row| KeyColumn {
                constraint_name: get_str(row, 0),
                key_type: KeyType::from_constraint_type(row.get::<&str, _>(1).unwrap_or_default()),
                column_name: get_str(row, 2),
                ordinal: row.get::<i32, _>(3).unwrap_or(0),
            })
            .collect();

        debug!("Loaded {} key columns for {}.{}", keys.len(), schema, table);
        Ok(keys)
    }

    async fn load_foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKeyColumn>> {
        let query = r#"
            SELECT
                fk.name,
                pc.name,
                rt.name,
                rc.name,
                fkc.constraint_column_id
            FROM sys.foreign_keys fk
            JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
            JOIN sys.tables pt ON fk.parent_object_id = pt.object_id
            JOIN sys.schemas ps ON pt.schema_id = ps.schema_id
            JOIN sys.columns pc ON fkc.parent_object_id = pc.object_id AND fkc.parent_column_id = pc.column_id
            JOIN sys.tables rt ON fk.referenced_object_id = rt.object_id
            JOIN sys.columns rc ON fkc.referenced_object_id = rc.object_id AND fkc.referenced_column_id = rc.column_id
            WHERE ps.name = @P1 AND pt.name = @P2
            ORDER BY fk.name, fkc.constraint_column_id
        "#;

        let rows = self.fetch(query, schema, table).await?;
        let fks: Vec<ForeignKeyColumn> = rows
            .iter()
            .map(|row| ForeignKeyColumn {
                constraint_name: get_str(row, 0),
                column_name: get_str(row, 1),
                ref_table: get_str(row, 2),
                ref_column: get_str(row, 3),
                ordinal: row.get::<i32, _>(4).unwrap_or(0),
            })
            .collect();

        debug!("Loaded {} foreign key columns for {}.{}", fks.len(), schema, table);
        Ok(fks)
    }

    async fn load_indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Index>> {
        let query = r#"
            SELECT
                i.name,
                i.is_unique,
                c.name
            FROM sys.indexes i
            JOIN sys.tables tb ON i.object_id = tb.object_id
            JOIN sys.schemas s ON tb.schema_id = s.schema_id
            JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id
            JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id
            WHERE s.name = @P1
              AND tb.name = @P2
              AND i.is_primary_key = 0
              AND i.is_unique_constraint = 0
              AND i.type > 0
              AND ic.is_included_column = 0
            ORDER BY i.name, ic.key_ordinal
        "#;

        let rows = self.fetch(query, schema, table).await?;

        let mut indexes: Vec<Index> = Vec::new();
        for row in &rows {
            let name = get_str(row, 0);
            let column = get_str(row, 2);
            match indexes.last_mut() {
                Some(idx) if idx.name == name => idx.columns.push(column),
                _ => indexes.push(Index {
                    name,
                    columns: vec![column],
                    is_unique: row.get::<bool, _>(1).unwrap_or(false),
                }),
            }
        }

        debug!("Loaded {} indexes for {}.{}", indexes.len(), schema, table);
        Ok(indexes)
    }
}
