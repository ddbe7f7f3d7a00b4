//! Application startup and lifecycle management.

use crate::config::{ReconciliationConfig, StoreBackend};
use crate::models::BatchReport;
use crate::services::{
    init_metrics, AccountStore, MemoryAccountStore, MemoryUnitLedger, PostgresAccountStore,
    ReconciliationEngine, UnitLedger, WorkUnitDriver,
};
use pipeline_core::error::AppError;
use pipeline_core::observability::write_metrics_textfile;
use std::path::PathBuf;
use std::sync::Arc;

/// One reconciliation batch: store handles acquired up front, then a single
/// pass over the attachments root.
pub struct Application {
    attachments_dir: PathBuf,
    metrics_textfile: Option<PathBuf>,
    driver: WorkUnitDriver,
    store: Arc<dyn AccountStore>,
    postgres: Option<PostgresAccountStore>,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ReconciliationConfig) -> Result<Self, AppError> {
        init_metrics();

        let (store, ledger, postgres) = match &config.store {
            StoreBackend::Postgres(database) => {
                let db = PostgresAccountStore::new(
                    &database.url,
                    database.max_connections,
                    database.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                    e
                })?;

                db.run_migrations().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to run migrations");
                    e
                })?;

                let db_store = Arc::new(db.clone());
                let store: Arc<dyn AccountStore> = db_store.clone();
                let ledger: Arc<dyn UnitLedger> = db_store;
                (store, ledger, Some(db))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory account store; balances are not persisted");
                let store: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
                let ledger: Arc<dyn UnitLedger> = Arc::new(MemoryUnitLedger::new());
                (store, ledger, None)
            }
        };

        store.health_check().await.map_err(|e| {
            tracing::error!(error = %e, "Account store health check failed");
            AppError::DatabaseError(anyhow::anyhow!("Account store unavailable: {}", e))
        })?;

        let ledger = if config.dedupe_units {
            Some(ledger)
        } else {
            tracing::info!("Unit ledger disabled - re-runs will count units again");
            None
        };

        let mut app = Self::with_store(config.common.attachments_dir.clone(), store, ledger);
        app.metrics_textfile = config.telemetry.metrics_textfile.clone();
        app.postgres = postgres;
        Ok(app)
    }

    /// Assemble an application around an already-acquired store.
    pub fn with_store(
        attachments_dir: PathBuf,
        store: Arc<dyn AccountStore>,
        ledger: Option<Arc<dyn UnitLedger>>,
    ) -> Self {
        let engine = ReconciliationEngine::new(store.clone());
        Self {
            attachments_dir,
            metrics_textfile: None,
            driver: WorkUnitDriver::new(engine, ledger),
            store,
            postgres: None,
        }
    }

    pub fn store(&self) -> Arc<dyn AccountStore> {
        self.store.clone()
    }

    /// Run the batch to completion and release the store.
    pub async fn run(self) -> Result<BatchReport, AppError> {
        tracing::info!(
            service = "reconciliation-service",
            version = env!("CARGO_PKG_VERSION"),
            attachments_dir = %self.attachments_dir.display(),
            "Starting reconciliation run"
        );

        let result = self.driver.run(&self.attachments_dir).await;

        if let Some(path) = &self.metrics_textfile {
            if let Err(e) = write_metrics_textfile(path) {
                tracing::warn!(error = %e, path = %path.display(), "Failed to write metrics textfile");
            }
        }

        if let Some(postgres) = &self.postgres {
            postgres.close().await;
        }

        result
    }
}
