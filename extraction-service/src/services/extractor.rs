//! Spooled message to unit-of-work folder.

use crate::models::{ExtractionOutcome, ExtractionReport};
use crate::services::metrics::{record_attachments, record_error, record_message_outcome};
use crate::services::mime::{split_message, MessageParts};
use crate::services::spool::{mark_processed, scan_spool};
use mailparse::{parse_mail, MailParseError};
use pipeline_core::error::AppError;
use pipeline_core::unit::UnitError;
use pipeline_core::UnitOfWork;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read message: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse MIME message: {0}")]
    Parse(#[from] MailParseError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("Failed to move message to processed: {0}")]
    MarkProcessed(#[source] std::io::Error),
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read(_) => "read_failed",
            Self::Parse(_) => "parse_failed",
            Self::Unit(_) => "unit_write_failed",
            Self::MarkProcessed(_) => "mark_processed_failed",
        }
    }
}

pub struct MailExtractor {
    attachments_root: PathBuf,
}

impl MailExtractor {
    pub fn new(attachments_root: impl Into<PathBuf>) -> Self {
        Self {
            attachments_root: attachments_root.into(),
        }
    }

    /// Extract every message in `spool_dir`, sequentially, in lexical order.
    pub fn run(&self, spool_dir: &Path) -> Result<ExtractionReport, AppError> {
        fs::create_dir_all(&self.attachments_root).map_err(|e| {
            AppError::IoError(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create attachments root {}: {}",
                    self.attachments_root.display(),
                    e
                ),
            ))
        })?;

        let messages = scan_spool(spool_dir).map_err(|e| {
            AppError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to scan spool {}: {}", spool_dir.display(), e),
            ))
        })?;

        info!(spool = %spool_dir.display(), messages = messages.len(), "Found spooled messages");

        let mut report = ExtractionReport::default();
        for message in &messages {
            report
                .outcomes
                .push(self.extract_message(spool_dir, message));
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Extraction batch finished"
        );

        Ok(report)
    }

    #[instrument(skip(self, spool_dir, message), fields(file = %message.display()))]
    pub fn extract_message(&self, spool_dir: &Path, message: &Path) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome {
            message: message
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        };

        match self.try_extract(spool_dir, message, &mut outcome) {
            Ok(()) => {
                outcome.success = true;
                record_message_outcome("extracted");
            }
            Err(e) => {
                warn!(error_kind = e.kind(), error = %e, "Message extraction failed");
                record_message_outcome("failed");
                record_error(e.kind());
                outcome.error = Some(e.to_string());
            }
        }

        outcome
    }

    fn try_extract(
        &self,
        spool_dir: &Path,
        message: &Path,
        outcome: &mut ExtractionOutcome,
    ) -> Result<(), ExtractionError> {
        let bytes = fs::read(message).map_err(ExtractionError::Read)?;
        let mail = parse_mail(&bytes)?;
        let parts = split_message(&mail)?;

        info!(
            subject = parts.subject.as_deref().unwrap_or_default(),
            from = parts.from.as_deref().unwrap_or_default(),
            "Processing email"
        );

        let unit = UnitOfWork::create(&self.attachments_root)?;
        if let Err(e) = write_parts(&unit, &parts, outcome) {
            // A half-written unit would be enriched as if it were complete.
            discard_unit(&unit, outcome);
            return Err(e.into());
        }

        // The message stays in the spool on failure, so the next run
        // extracts it again into a fresh unit.
        if let Err(e) = mark_processed(spool_dir, message) {
            discard_unit(&unit, outcome);
            return Err(ExtractionError::MarkProcessed(e));
        }

        outcome.unit = Some(unit.id.clone());
        record_attachments(outcome.attachments.len());

        info!(
            unit = %unit.id,
            body_written = outcome.body_written,
            attachments = ?outcome.attachments,
            "Message extracted"
        );

        Ok(())
    }
}

fn discard_unit(unit: &UnitOfWork, outcome: &mut ExtractionOutcome) {
    if let Err(cleanup) = fs::remove_dir_all(&unit.path) {
        warn!(unit = %unit.id, error = %cleanup, "Failed to remove unfinished unit");
    }
    outcome.unit = None;
    outcome.body_written = false;
    outcome.attachments.clear();
}

fn write_parts(
    unit: &UnitOfWork,
    parts: &MessageParts,
    outcome: &mut ExtractionOutcome,
) -> Result<(), UnitError> {
    if let Some(body) = &parts.body {
        unit.write_email_text(body)?;
        outcome.body_written = true;
    }
    for attachment in &parts.attachments {
        let name = unit.write_attachment(&attachment.filename, &attachment.content)?;
        outcome.attachments.push(name);
    }
    Ok(())
}
