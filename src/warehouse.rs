//! Live warehouse catalog boundary.
//!
//! Connectivity itself (drivers, wire protocols, authentication flows)
//! lives outside this crate; what lives here is the contract a connector
//! must satisfy — [`CatalogSource`] — plus the conversion from ordered
//! catalog rows into the canonical [`Schema`] shape and the connection
//! settings sourced from the environment.

use thiserror::Error;

use crate::schema::{LogicalType, Schema};

/// Failure taxonomy for catalog operations. Each failure names the
/// operation that produced it; a failed call is terminal (no retries).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing warehouse credential: environment variable {0} is not set")]
    MissingCredential(&'static str),
    #[error("failed to connect to warehouse: {0}")]
    Connection(String),
    #[error("catalog operation '{operation}' failed: {reason}")]
    Query { operation: String, reason: String },
}

/// Connection settings for a live warehouse, read from `SNOWFLAKE_*`
/// environment variables. Credentials are never hardcoded.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub account: String,
    pub user: String,
    pub password: String,
    pub warehouse: String,
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self, CatalogError> {
        Ok(Self {
            account: require_env("SNOWFLAKE_ACCOUNT")?,
            user: require_env("SNOWFLAKE_USER")?,
            password: require_env("SNOWFLAKE_PASSWORD")?,
            warehouse: require_env("SNOWFLAKE_WAREHOUSE")?,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, CatalogError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CatalogError::MissingCredential(name)),
    }
}

/// One column's catalog metadata, in physical ordinal position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
}

/// The catalog capability a live connector provides: enumeration of
/// databases, schemas, and tables, plus column metadata for one table.
/// All operations are single-attempt and fallible.
pub trait CatalogSource {
    fn databases(&self) -> Result<Vec<String>, CatalogError>;
    fn schemas(&self, database: &str) -> Result<Vec<String>, CatalogError>;
    fn tables(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError>;
    fn table_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CatalogColumn>, CatalogError>;
}

/// Fetches one table's live schema, upper-casing both column names and
/// type tokens into the canonical shape.
pub fn fetch_table_schema(
    source: &dyn CatalogSource,
    database: &str,
    schema: &str,
    table: &str,
) -> Result<Schema, CatalogError> {
    let columns = source.table_columns(database, schema, table)?;
    Ok(columns
        .into_iter()
        .map(|column| (column.name, LogicalType::from_token(&column.data_type)))
        .collect())
}
