//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{ConvertError, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;
use tracing::debug;

/// Environment variable overriding `source.password`.
pub const SOURCE_PASSWORD_ENV: &str = "SCHEMA_CONVERT_SOURCE_PASSWORD";

/// Environment variable overriding `target.password`.
pub const TARGET_PASSWORD_ENV: &str = "SCHEMA_CONVERT_TARGET_PASSWORD";

impl Config {
    /// Load configuration from a YAML file, applying environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override secrets from the environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(SOURCE_PASSWORD_ENV) {
            debug!("Using source password from {}", SOURCE_PASSWORD_ENV);
            self.source.password = password;
        }
        if let Some(password) = lookup(TARGET_PASSWORD_ENV) {
            debug!("Using target password from {}", TARGET_PASSWORD_ENV);
            self.target.password = password;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Build the table filter from include/exclude patterns.
    pub fn table_filter(&self) -> Result<TableFilter> {
        TableFilter::new(&self.migration.include_tables, &self.migration.exclude_tables)
    }
}

/// Include/exclude glob filter over source table names.
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl TableFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    /// A table passes when it matches an include pattern (or there are none)
    /// and matches no exclude pattern.
    pub fn matches(&self, table: &str) -> bool {
        let opts = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let included =
            self.include.is_empty() || self.include.iter().any(|p| p.matches_with(table, opts));
        let excluded = self.exclude.iter().any(|p| p.matches_with(table, opts));
        included && !excluded
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| ConvertError::Config(format!("invalid table pattern '{}': {}", p, e)))
        })
        .collect()
}
