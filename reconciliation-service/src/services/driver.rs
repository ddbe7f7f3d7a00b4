//! Batch driver: one reconciliation per unit of work, failures isolated.

use crate::error::ReconcileError;
use crate::models::{BatchReport, UnitOutcome};
use crate::services::engine::ReconciliationEngine;
use crate::services::metrics::{record_error, record_reconciliation, record_unit_outcome};
use crate::services::store::UnitLedger;
use pipeline_core::error::AppError;
use pipeline_core::unit::{list_units, UnitError};
use pipeline_core::UnitOfWork;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const SKIPPED_MESSAGE: &str = "already reconciled, skipped";

pub struct WorkUnitDriver {
    engine: ReconciliationEngine,
    ledger: Option<Arc<dyn UnitLedger>>,
}

impl WorkUnitDriver {
    /// `ledger` enables skipping units that were reconciled by an earlier run.
    pub fn new(engine: ReconciliationEngine, ledger: Option<Arc<dyn UnitLedger>>) -> Self {
        Self { engine, ledger }
    }

    /// Reconcile every unit under `root`, sequentially, in enumeration order.
    ///
    /// Only an unreadable root is an error; per-unit problems end up in the
    /// returned report.
    pub async fn run(&self, root: &Path) -> Result<BatchReport, AppError> {
        let units = list_units(root).map_err(|e| {
            AppError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to list units in {}: {}", root.display(), e),
            ))
        })?;

        info!(root = %root.display(), units = units.len(), "Starting reconciliation batch");

        let mut report = BatchReport::default();
        for unit in &units {
            report.outcomes.push(self.process_unit(unit).await);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Reconciliation batch finished"
        );

        Ok(report)
    }

    #[instrument(skip(self, unit), fields(unit = %unit.id))]
    pub async fn process_unit(&self, unit: &UnitOfWork) -> UnitOutcome {
        let record = match unit.read_record() {
            Ok(record) => record,
            Err(e) => return self.failed(unit, &record_error_for(e)),
        };

        if let Some(ledger) = &self.ledger {
            match ledger.is_consumed(&unit.id).await {
                Ok(true) => {
                    info!("Unit already reconciled, skipping");
                    record_unit_outcome("skipped");
                    return UnitOutcome::succeeded(&unit.id, SKIPPED_MESSAGE);
                }
                Ok(false) => {}
                Err(e) => {
                    return self.failed(unit, &ReconcileError::StoreReadFailed(e));
                }
            }
        }

        let reconciled = match self.engine.reconcile(&record).await {
            Ok(reconciled) => reconciled,
            Err(e) => return self.failed(unit, &e),
        };

        record_unit_outcome("reconciled");
        record_reconciliation(
            reconciled.action.as_str(),
            reconciled.contribution.to_f64().unwrap_or_default(),
        );

        let mut message = reconciled.message();
        if let Some(ledger) = &self.ledger {
            if let Err(e) = ledger.mark_consumed(&unit.id, &reconciled.username).await {
                // The balance is already committed; a re-run would count it again.
                warn!(error = %e, "Failed to record unit in ledger");
                record_error("ledger_write_failed");
                message = format!("{}; ledger update failed: {}", message, e);
            }
        }

        UnitOutcome::succeeded(&unit.id, message)
    }

    fn failed(&self, unit: &UnitOfWork, e: &ReconcileError) -> UnitOutcome {
        match e {
            ReconcileError::RecordInvalid { detail, .. } => {
                warn!(error_kind = e.kind(), detail = %detail, "Unit record invalid");
            }
            _ if e.is_retryable() => {
                error!(error_kind = e.kind(), error = %e, "Unit reconciliation failed");
            }
            _ => warn!(error_kind = e.kind(), error = %e, "Unit reconciliation failed"),
        }
        record_unit_outcome("failed");
        record_error(e.kind());

        UnitOutcome::failed(&unit.id, e.to_string(), e.kind(), e.is_retryable())
    }
}

fn record_error_for(e: UnitError) -> ReconcileError {
    match e {
        UnitError::RecordMissing(unit) => ReconcileError::RecordNotFound { unit },
        UnitError::RecordInvalid { unit, source } => ReconcileError::RecordInvalid {
            unit,
            detail: source.to_string(),
        },
        UnitError::Io { unit, source } => ReconcileError::RecordInvalid {
            unit,
            detail: source.to_string(),
        },
    }
}
