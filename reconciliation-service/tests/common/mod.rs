//! Common test utilities for reconciliation-service integration tests.

use async_trait::async_trait;
use reconciliation_service::models::AccountRecord;
use reconciliation_service::services::{
    AccountStore, MemoryAccountStore, MemoryUnitLedger, StoreError, UnitLedger,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,reconciliation_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
/// Create a unit folder named `id` under `root` holding `record` as its
/// `output.json`.
pub fn write_unit(root: &Path, id: &str, record: Value) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).expect("Failed to create unit dir");
    fs::write(
        dir.join("output.json"),
        serde_json::to_vec_pretty(&record).expect("Failed to encode record"),
    )
    .expect("Failed to write record");
    dir
}

/// Create a unit folder with raw, possibly broken, `output.json` content.
#[allow(dead_code)]
pub fn write_raw_unit(root: &Path, id: &str, content: &str) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).expect("Failed to create unit dir");
    fs::write(dir.join("output.json"), content).expect("Failed to write record");
    dir
}

/// Which store call should fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Get,
    Insert,
    Replace,
}

/// Memory store that returns `Unavailable` for one kind of call.
#[allow(dead_code)]
pub struct FailingStore {
    pub inner: MemoryAccountStore,
    fail_on: FailOn,
    pub failures: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryAccountStore::new(),
            fail_on,
            failures: AtomicUsize::new(0),
        }
    }

    fn fail(&self, op: FailOn) -> Result<(), StoreError> {
        if self.fail_on == op {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("connection reset by peer".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FailingStore {
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        self.fail(FailOn::Get)?;
        self.inner.get(username).await
    }

    async fn insert(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.fail(FailOn::Insert)?;
        self.inner.insert(record).await
    }

    async fn replace(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.fail(FailOn::Replace)?;
        self.inner.replace(record).await
    }
}

/// Which ledger call should fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFailOn {
    IsConsumed,
    MarkConsumed,
}

/// Memory ledger that returns `Unavailable` for one kind of call.
#[allow(dead_code)]
pub struct FailingLedger {
    pub inner: MemoryUnitLedger,
    fail_on: LedgerFailOn,
}

#[allow(dead_code)]
impl FailingLedger {
    pub fn new(fail_on: LedgerFailOn) -> Self {
        Self {
            inner: MemoryUnitLedger::new(),
            fail_on,
        }
    }

    fn fail(&self, op: LedgerFailOn) -> Result<(), StoreError> {
        if self.fail_on == op {
            return Err(StoreError::Unavailable("ledger table locked".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitLedger for FailingLedger {
    async fn is_consumed(&self, unit_id: &str) -> Result<bool, StoreError> {
        self.fail(LedgerFailOn::IsConsumed)?;
        self.inner.is_consumed(unit_id).await
    }

    async fn mark_consumed(&self, unit_id: &str, username: &str) -> Result<(), StoreError> {
        self.fail(LedgerFailOn::MarkConsumed)?;
        self.inner.mark_consumed(unit_id, username).await
    }
}
