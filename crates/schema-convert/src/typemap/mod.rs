//! Type mapping between MSSQL and PostgreSQL.
//!
//! Lookup is case-sensitive on the `DATA_TYPE` token reported by SQL Server,
//! which is always lower case. Anything not in [`TYPE_MAP`] is passed through
//! unchanged.

/// MSSQL type name to PostgreSQL type name.
pub const TYPE_MAP: &[(&str, &str)] = &[
    ("nvarchar", "varchar"),
    ("tinyint", "smallint"),
    ("bigint", "bigint"),
    ("int", "int"),
    ("sysname", "varchar"),
    ("xml", "xml"),
    ("float", "double precision"),
    ("uniqueidentifier", "uuid"),
    ("geography", "geography"),
    ("varbinary", "bytea"),
    ("smalldatetime", "timestamp"),
];

/// Map an MSSQL data type to PostgreSQL.
pub fn mssql_to_postgres(mssql_type: &str) -> &str {
    lookup(mssql_type).unwrap_or(mssql_type)
}

/// Whether the type has an explicit mapping.
pub fn is_mapped(mssql_type: &str) -> bool {
    lookup(mssql_type).is_some()
}

fn lookup(mssql_type: &str) -> Option<&'static str> {
    TYPE_MAP
        .iter()
        .find(|(source, _)| *source == mssql_type)
        .map(|(_, target)| *target)
}
