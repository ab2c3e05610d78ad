//! Error types for the schema conversion library.

use crate::ddl::StatementKind;
use thiserror::Error;

/// Main error type for schema conversion operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] tiberius::error::Error),

    /// Target database connection or query error
    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Reading table metadata from the source failed
    #[error("Metadata read failed for table {table}: {message}")]
    MetadataRead { table: String, message: String },

    /// The target rejected a generated statement
    #[error("{kind} {object} failed: {message}")]
    Statement {
        kind: StatementKind,
        object: String,
        message: String,
    },

    /// A source name cannot be written as a target identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Table has no columns, so no valid CREATE TABLE can be produced
    #[error("Empty table: table '{0}' has no columns")]
    EmptyTable(String),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Run was cancelled (SIGINT, etc.)
    #[error("Schema conversion cancelled")]
    Cancelled,
}

impl ConvertError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        ConvertError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a MetadataRead error
    pub fn metadata(table: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::MetadataRead {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Statement error
    pub fn statement(
        kind: StatementKind,
        object: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConvertError::Statement {
            kind,
            object: object.into(),
            message: message.into(),
        }
    }

    /// Whether this error means a database endpoint could not be reached.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ConvertError::Source(_) | ConvertError::Target(_) | ConvertError::Pool { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::Config(_) | ConvertError::Yaml(_) => 2,
            ConvertError::Source(_) | ConvertError::Target(_) | ConvertError::Pool { .. } => 3,
            ConvertError::Cancelled => 130,
            _ => 1,
        }
    }

    /// One-line message including every error in the source chain.
    pub fn message_chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = err.source();
        }
        message
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
