//! Cross-stage pipeline integration tests library.
//!
//! Runs extraction, enrichment and reconciliation in-process over one
//! on-disk workspace, with scripted engines standing in for the LLM and OCR
//! backends and an in-memory account store standing in for PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo test -p workflow-tests
//! ```

use anyhow::{anyhow, Result};
use enrichment_service::models::EnrichmentReport;
use enrichment_service::services::{OcrEngine, TextProvider};
use extraction_service::models::ExtractionReport;
use reconciliation_service::models::BatchReport;
use reconciliation_service::services::{AccountStore, UnitLedger};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Spool and attachments directories shared by the three stages.
#[derive(Debug, Clone)]
pub struct PipelineWorkspace {
    pub spool_dir: PathBuf,
    pub attachments_dir: PathBuf,
}

impl PipelineWorkspace {
    /// Lay out `mail/` and `attachments/` under `root`.
    pub fn create(root: &Path) -> Result<Self> {
        let spool_dir = root.join("mail");
        let attachments_dir = root.join("attachments");
        fs::create_dir_all(&spool_dir)?;
        fs::create_dir_all(&attachments_dir)?;
        Ok(Self {
            spool_dir,
            attachments_dir,
        })
    }

    /// Drop a raw message into the spool.
    pub fn deliver(&self, file_name: &str, raw: &str) -> Result<PathBuf> {
        let path = self.spool_dir.join(file_name);
        fs::write(&path, raw)?;
        Ok(path)
    }
}

/// Engines and store wired into one pipeline run.
#[derive(Clone)]
pub struct PipelineEngines {
    pub text: Arc<dyn TextProvider>,
    pub ocr: Arc<dyn OcrEngine>,
    pub store: Arc<dyn AccountStore>,
    pub ledger: Option<Arc<dyn UnitLedger>>,
}

/// Per-stage reports of one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    pub extraction: ExtractionReport,
    pub enrichment: EnrichmentReport,
    pub reconciliation: BatchReport,
}

/// Run all three stages in order over `workspace`.
pub async fn run_pipeline(
    workspace: &PipelineWorkspace,
    engines: &PipelineEngines,
) -> Result<PipelineReport> {
    let extraction = extraction_service::startup::Application::new(
        workspace.spool_dir.clone(),
        workspace.attachments_dir.clone(),
    )
    .run()
    .map_err(|e| anyhow!("Extraction stage failed: {}", e))?;

    tracing::debug!(
        succeeded = extraction.succeeded(),
        failed = extraction.failed(),
        "Extraction stage finished"
    );

    let enrichment = enrich(workspace, engines).await?;
    let reconciliation = reconcile(workspace, engines).await?;

    Ok(PipelineReport {
        extraction,
        enrichment,
        reconciliation,
    })
}

/// Run only the enrichment stage.
pub async fn enrich(
    workspace: &PipelineWorkspace,
    engines: &PipelineEngines,
) -> Result<EnrichmentReport> {
    enrichment_service::startup::Application::with_engines(
        workspace.attachments_dir.clone(),
        engines.text.clone(),
        engines.ocr.clone(),
    )
    .run()
    .await
    .map_err(|e| anyhow!("Enrichment stage failed: {}", e))
}

/// Run only the reconciliation stage.
pub async fn reconcile(
    workspace: &PipelineWorkspace,
    engines: &PipelineEngines,
) -> Result<BatchReport> {
    reconciliation_service::startup::Application::with_store(
        workspace.attachments_dir.clone(),
        engines.store.clone(),
        engines.ledger.clone(),
    )
    .run()
    .await
    .map_err(|e| anyhow!("Reconciliation stage failed: {}", e))
}
