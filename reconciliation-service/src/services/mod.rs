//! Services module for reconciliation-service.

pub mod amount;
pub mod database;
pub mod driver;
pub mod engine;
pub mod memory;
pub mod merge;
pub mod metrics;
pub mod store;

pub use amount::{normalize_amount, render_amount, AmountError};
pub use database::PostgresAccountStore;
pub use driver::WorkUnitDriver;
pub use engine::ReconciliationEngine;
pub use memory::{MemoryAccountStore, MemoryUnitLedger};
pub use metrics::{
    init_metrics, record_error, record_reconciliation, record_unit_outcome, DB_QUERY_DURATION,
};
pub use store::{AccountStore, StoreError, UnitLedger};
