//! Errors raised while reconciling a single unit of work.

use crate::services::amount::AmountError;
use crate::services::store::StoreError;
use thiserror::Error;

/// Message reported for units whose record cannot be loaded.
pub const RECORD_UNAVAILABLE: &str = "record missing or invalid";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Username not found in input data")]
    MissingKey,

    #[error("Invalid transaction amount: {0}")]
    MalformedAmount(#[from] AmountError),

    #[error("record missing or invalid")]
    RecordNotFound { unit: String },

    #[error("record missing or invalid")]
    RecordInvalid { unit: String, detail: String },

    #[error("Failed to read account record: {0}")]
    StoreReadFailed(#[source] StoreError),

    #[error("Failed to insert account record: {0}")]
    StoreInsertFailed(#[source] StoreError),

    #[error("Failed to write account record: {0}")]
    StoreWriteFailed(#[source] StoreError),
}

impl ReconcileError {
    /// Label for logs and the `error_type` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingKey => "missing_key",
            Self::MalformedAmount(_) => "malformed_amount",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::RecordInvalid { .. } => "record_invalid",
            Self::StoreReadFailed(_) => "store_read_failed",
            Self::StoreInsertFailed(_) => "store_insert_failed",
            Self::StoreWriteFailed(_) => "store_write_failed",
        }
    }

    /// Only persistence failures are transient. Everything else needs the
    /// upstream data corrected before another attempt can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreReadFailed(_) | Self::StoreInsertFailed(_) | Self::StoreWriteFailed(_)
        )
    }
}
