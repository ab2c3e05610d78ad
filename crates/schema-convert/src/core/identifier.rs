//! Identifier validation and escaping for generated PostgreSQL DDL.
//!
//! SQL identifiers (table names, column names, constraint names) cannot be
//! passed as statement parameters, so they are interpolated into DDL text.
//! Every identifier is validated first and then written either bare or
//! double-quoted:
//!
//! 1. Names matching a reserved word (case-insensitive) are quoted.
//! 2. Names that are not valid bare identifiers are quoted.
//! 3. Everything else is written unchanged, so PostgreSQL folds it to lower case.

use crate::error::{ConvertError, Result};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::warn;

/// Longest accepted source identifier, in bytes. SQL Server allows 128
/// characters, so a multi-byte name may still be rejected here.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// PostgreSQL truncates identifiers longer than this many bytes (NAMEDATALEN - 1).
const PG_MAX_IDENTIFIER_LENGTH: usize = 63;

/// Reserved words that always need quoting in the target.
pub const DEFAULT_RESERVED_WORDS: &[&str] = &["OFFSET"];

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConvertError::InvalidIdentifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ConvertError::InvalidIdentifier(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConvertError::InvalidIdentifier(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Whether PostgreSQL would truncate `name`.
fn exceeds_target_limit(name: &str) -> bool {
    name.len() > PG_MAX_IDENTIFIER_LENGTH
}

/// Quote a PostgreSQL identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
pub fn quote_pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether a name can be written without quotes.
fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Reserved words of the target dialect.
#[derive(Debug, Clone)]
pub struct ReservedWords {
    words: HashSet<String>,
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

impl ReservedWords {
    /// Default reserved words plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = DEFAULT_RESERVED_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.into_iter().map(|w| w.as_ref().trim().to_uppercase()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Whether `name` is a reserved word (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.words.contains(&name.to_uppercase())
    }

    /// Escape a name for use in target DDL.
    pub fn escape<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.contains(name) || !is_bare_identifier(name) {
            Cow::Owned(quote_pg(name))
        } else {
            Cow::Borrowed(name)
        }
    }

    /// Validate then escape.
    ///
    /// Names longer than PostgreSQL keeps are accepted with a warning; the
    /// target stores them truncated, so two such names may collide.
    pub fn ident(&self, name: &str) -> Result<String> {
        validate_identifier(name)?;
        if exceeds_target_limit(name) {
            warn!(
                "Identifier {:?} is {} bytes; PostgreSQL will truncate it to {}",
                name,
                name.len(),
                PG_MAX_IDENTIFIER_LENGTH
            );
        }
        Ok(self.escape(name).into_owned())
    }
}
