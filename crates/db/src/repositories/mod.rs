use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use thiserror::Error;

use motofleet_core::errors::StoreError;

use crate::DbPool;

pub mod customer;
pub mod discount;
pub mod markup;
pub mod memory;
pub mod part;
pub mod price_list;

pub use memory::InMemoryPricingStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(source) => StoreError::Query(source.to_string()),
            RepositoryError::Decode(message) => StoreError::Decode(message),
        }
    }
}

/// SQLite-backed implementation of every pricing collaborator store. The trait impls are split
/// by table family across the sibling modules.
#[derive(Clone)]
pub struct SqlPricingStore {
    pool: DbPool,
}

impl SqlPricingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, RepositoryError> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("invalid decimal in {column}: {error}")))
}

pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column)?;
    parse_decimal(column, &raw)
}

pub(crate) fn optional_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw: Option<String> = row.try_get(column)?;
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| parse_decimal(column, &value))
        .transpose()
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp in {column}: {error}")))
}

pub(crate) fn optional_timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| parse_timestamp(column, &value)).transpose()
}

pub(crate) fn flag_column(row: &SqliteRow, column: &str) -> Result<bool, RepositoryError> {
    let raw: i64 = row.try_get(column)?;
    Ok(raw != 0)
}

pub(crate) fn count_column(
    row: &SqliteRow,
    column: &str,
    table: &str,
    id: i64,
) -> Result<u32, RepositoryError> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).map_err(|_| {
        RepositoryError::Decode(format!("{table} {id}: {column} must be a non-negative count"))
    })
}
