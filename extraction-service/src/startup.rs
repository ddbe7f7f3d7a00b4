//! Application startup and lifecycle management.

use crate::config::ExtractionConfig;
use crate::models::ExtractionReport;
use crate::services::{init_metrics, MailExtractor};
use pipeline_core::error::AppError;
use pipeline_core::observability::write_metrics_textfile;
use std::path::PathBuf;

/// One pass over the mail spool.
pub struct Application {
    spool_dir: PathBuf,
    metrics_textfile: Option<PathBuf>,
    extractor: MailExtractor,
}

impl Application {
    /// Build the application with the given configuration.
    pub fn build(config: ExtractionConfig) -> Result<Self, AppError> {
        init_metrics();

        if !config.spool_dir.is_dir() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MAIL_SPOOL_DIR {} is not a directory",
                config.spool_dir.display()
            )));
        }

        let mut app = Self::new(config.spool_dir, config.common.attachments_dir);
        app.metrics_textfile = config.telemetry.metrics_textfile;
        Ok(app)
    }

    pub fn new(spool_dir: PathBuf, attachments_dir: PathBuf) -> Self {
        Self {
            spool_dir,
            metrics_textfile: None,
            extractor: MailExtractor::new(attachments_dir),
        }
    }

    /// Run the batch to completion.
    pub fn run(self) -> Result<ExtractionReport, AppError> {
        tracing::info!(
            service = "extraction-service",
            version = env!("CARGO_PKG_VERSION"),
            spool_dir = %self.spool_dir.display(),
            "Starting extraction run"
        );

        let result = self.extractor.run(&self.spool_dir);

        if let Some(path) = &self.metrics_textfile {
            if let Err(e) = write_metrics_textfile(path) {
                tracing::warn!(error = %e, path = %path.display(), "Failed to write metrics textfile");
            }
        }

        result
    }
}
