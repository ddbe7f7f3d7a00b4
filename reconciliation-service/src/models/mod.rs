//! Domain models for reconciliation-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Account Models
// ============================================================================

/// Persisted running balance for one counterparty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Primary key; never changes after creation.
    pub username: String,
    /// Decimal total rendered as text, e.g. `"150.5"`.
    pub transaction_amount: String,
    pub utr: Option<String>,
    pub transaction_id: Option<String>,
    /// Open bag of any other fields seen on incoming records.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl AccountRecord {
    pub fn new(username: impl Into<String>, transaction_amount: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            transaction_amount: transaction_amount.into(),
            utr: None,
            transaction_id: None,
            attributes: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Reconciliation Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    Created,
    Updated,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Successful outcome of merging one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub username: String,
    pub action: ReconcileAction,
    /// Amount this record contributed.
    pub contribution: Decimal,
    /// Stored total after the write.
    pub total: Decimal,
}

impl Reconciled {
    pub fn message(&self) -> String {
        match self.action {
            ReconcileAction::Created => "Account record created successfully".to_string(),
            ReconcileAction::Updated => "Account record updated successfully".to_string(),
        }
    }
}

// ============================================================================
// Batch Reporting
// ============================================================================

/// Result for one unit of work in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutcome {
    pub unit: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    pub retryable: bool,
}

impl UnitOutcome {
    pub fn succeeded(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            success: true,
            message: message.into(),
            error_kind: None,
            retryable: false,
        }
    }

    pub fn failed(
        unit: impl Into<String>,
        message: impl Into<String>,
        error_kind: &'static str,
        retryable: bool,
    ) -> Self {
        Self {
            unit: unit.into(),
            success: false,
            message: message.into(),
            error_kind: Some(error_kind),
            retryable,
        }
    }
}

/// Ordered per-unit outcomes of one driver run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// Units whose failure may clear up on a later run without data fixes.
    pub fn retryable_units(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.success && o.retryable)
            .map(|o| o.unit.as_str())
            .collect()
    }
}
