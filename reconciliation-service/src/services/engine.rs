//! Read-modify-write reconciliation of one extracted record.

use crate::error::ReconcileError;
use crate::models::{AccountRecord, ReconcileAction, Reconciled};
use crate::services::amount::{add_amounts, normalize_amount, render_amount};
use crate::services::merge::merge_into;
use crate::services::store::AccountStore;
use pipeline_core::ExtractedRecord;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Merges extracted records into the account store.
///
/// Each call does exactly one store read and, on success, exactly one store
/// write. Calls are not idempotent: the same record reconciled twice is
/// counted twice. Concurrent calls for the same username are not safe.
#[derive(Clone)]
pub struct ReconciliationEngine {
    store: Arc<dyn AccountStore>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, record), fields(username = record.key().unwrap_or_default()))]
    pub async fn reconcile(&self, record: &ExtractedRecord) -> Result<Reconciled, ReconcileError> {
        let username = record.key().ok_or(ReconcileError::MissingKey)?;

        let existing = self
            .store
            .get(username)
            .await
            .map_err(ReconcileError::StoreReadFailed)?;

        match existing {
            None => self.create(username, record).await,
            Some(account) => self.update(account, record).await,
        }
    }

    async fn create(
        &self,
        username: &str,
        record: &ExtractedRecord,
    ) -> Result<Reconciled, ReconcileError> {
        let contribution = normalize_amount(record.transaction_amount.as_deref().unwrap_or("0"))?;

        let mut account = AccountRecord::new(username, render_amount(contribution));
        merge_into(&mut account, record, contribution);

        self.store
            .insert(&account)
            .await
            .map_err(ReconcileError::StoreInsertFailed)?;

        info!(
            username = %account.username,
            transaction_amount = %account.transaction_amount,
            "New account record inserted"
        );

        Ok(Reconciled {
            username: account.username,
            action: ReconcileAction::Created,
            contribution,
            total: contribution,
        })
    }

    async fn update(
        &self,
        mut account: AccountRecord,
        record: &ExtractedRecord,
    ) -> Result<Reconciled, ReconcileError> {
        debug!(
            username = %account.username,
            transaction_amount = %account.transaction_amount,
            "Existing account record found"
        );

        let existing_amount = normalize_amount(&account.transaction_amount)?;
        let contribution = normalize_amount(record.transaction_amount.as_deref().unwrap_or("0"))?;
        let total: Decimal = add_amounts(existing_amount, contribution)?;

        merge_into(&mut account, record, total);

        self.store
            .replace(&account)
            .await
            .map_err(ReconcileError::StoreWriteFailed)?;

        info!(
            username = %account.username,
            previous_amount = %existing_amount,
            contribution = %contribution,
            transaction_amount = %account.transaction_amount,
            "Account record updated"
        );

        Ok(Reconciled {
            username: account.username,
            action: ReconcileAction::Updated,
            contribution,
            total,
        })
    }
}
