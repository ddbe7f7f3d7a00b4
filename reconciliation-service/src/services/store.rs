//! Persistence seams for account records and consumed units.
//!
//! The engine and driver only ever talk to these traits; the Postgres
//! implementation lives in `database`, the in-process one in `memory`.

use crate::models::AccountRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Key-value store of account records keyed by username.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Exact-key lookup.
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Insert a record that must not exist yet.
    async fn insert(&self, record: &AccountRecord) -> Result<(), StoreError>;

    /// Overwrite the full record.
    async fn replace(&self, record: &AccountRecord) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Ledger of units whose records were already added to a balance.
#[async_trait]
pub trait UnitLedger: Send + Sync {
    async fn is_consumed(&self, unit_id: &str) -> Result<bool, StoreError>;

    async fn mark_consumed(&self, unit_id: &str, username: &str) -> Result<(), StoreError>;
}
