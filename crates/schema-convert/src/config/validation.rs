//! Configuration validation.

use super::{Config, TableFilter};
use crate::error::{ConvertError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(ConvertError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(ConvertError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(ConvertError::Config("source.user is required".into()));
    }
    if config.source.schema.is_empty() {
        return Err(ConvertError::Config("source.schema cannot be empty".into()));
    }
    if config.source.r#type != "mssql" {
        return Err(ConvertError::Config(format!(
            "source.type must be 'mssql', got '{}'",
            config.source.r#type
        )));
    }

    // Target validation
    if config.target.host.is_empty() {
        return Err(ConvertError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(ConvertError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(ConvertError::Config("target.user is required".into()));
    }
    if let Some(schema) = &config.target.schema {
        crate::core::validate_identifier(schema)
            .map_err(|e| ConvertError::Config(format!("target.schema: {}", e)))?;
    }
    if config.target.r#type != "postgres" {
        return Err(ConvertError::Config(format!(
            "target.type must be 'postgres', got '{}'",
            config.target.r#type
        )));
    }

    // Cannot convert into the same database
    if config.source.host == config.target.host
        && config.source.port == config.target.port
        && config.source.database == config.target.database
    {
        return Err(ConvertError::Config(
            "source and target cannot be the same database".into(),
        ));
    }

    if let Some(0) = config.migration.workers {
        return Err(ConvertError::Config(
            "migration.workers must be at least 1".into(),
        ));
    }

    if config.migration.reserved_words.iter().any(|w| w.trim().is_empty()) {
        return Err(ConvertError::Config(
            "migration.reserved_words cannot contain empty entries".into(),
        ));
    }

    TableFilter::new(&config.migration.include_tables, &config.migration.exclude_tables)?;

    Ok(())
}
