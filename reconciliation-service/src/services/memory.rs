//! In-process store and ledger, used for dry runs and tests.

use crate::models::AccountRecord;
use crate::services::store::{AccountStore, StoreError, UnitLedger};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryAccountStore {
    records: RwLock<HashMap<String, AccountRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store without counting it as a write.
    pub async fn seed(&self, record: AccountRecord) {
        self.records
            .write()
            .await
            .insert(record.username.clone(), record);
    }

    /// Current record for `username`, without counting it as a read.
    pub async fn snapshot(&self, username: &str) -> Option<AccountRecord> {
        self.records.read().await.get(username).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().await.get(username).cloned())
    }

    async fn insert(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        if records.contains_key(&record.username) {
            return Err(StoreError::Conflict(record.username.clone()));
        }
        records.insert(record.username.clone(), record.clone());
        Ok(())
    }

    async fn replace(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .write()
            .await
            .insert(record.username.clone(), record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUnitLedger {
    consumed: RwLock<HashMap<String, String>>,
}

impl MemoryUnitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn consumed_by(&self, unit_id: &str) -> Option<String> {
        self.consumed.read().await.get(unit_id).cloned()
    }
}

#[async_trait]
impl UnitLedger for MemoryUnitLedger {
    async fn is_consumed(&self, unit_id: &str) -> Result<bool, StoreError> {
        Ok(self.consumed.read().await.contains_key(unit_id))
    }

    async fn mark_consumed(&self, unit_id: &str, username: &str) -> Result<(), StoreError> {
        self.consumed
            .write()
            .await
            .entry(unit_id.to_string())
            .or_insert_with(|| username.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_rejects_existing_username() {
        let store = MemoryAccountStore::new();
        store
            .insert(&AccountRecord::new("alice", "1.0"))
            .await
            .unwrap();

        let result = store.insert(&AccountRecord::new("alice", "2.0")).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(
            store.snapshot("alice").await.unwrap().transaction_amount,
            "1.0"
        );
    }

    #[tokio::test]
    async fn ledger_keeps_first_consumer() {
        let ledger = MemoryUnitLedger::new();
        ledger.mark_consumed("unit-1", "alice").await.unwrap();
        ledger.mark_consumed("unit-1", "bob").await.unwrap();

        assert!(ledger.is_consumed("unit-1").await.unwrap());
        assert!(!ledger.is_consumed("unit-2").await.unwrap());
        assert_eq!(ledger.consumed_by("unit-1").await.as_deref(), Some("alice"));
    }
}
