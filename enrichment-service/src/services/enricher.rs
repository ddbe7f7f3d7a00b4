//! Per-unit enrichment: email text and receipt image to `output.json`.

use crate::models::{EnrichmentOutcome, EnrichmentReport, Source};
use crate::services::metrics::{
    record_error, record_llm_request, record_ocr_run, record_unit_outcome, LLM_LATENCY,
};
use crate::services::ocr::{is_receipt_image, strip_currency_symbols, OcrEngine, OcrError};
use crate::services::parser::{parse_reply, ReplyField};
use crate::services::providers::{GenerationParams, TextProvider};
use pipeline_core::error::AppError;
use pipeline_core::unit::{list_units, UnitError};
use pipeline_core::{ExtractedRecord, UnitOfWork};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub fn email_prompt(email_text: &str) -> String {
    format!(
        "Extract the following details from the email body:\n\
         - Username\n\
         - UTR (Transaction Reference Number)\n\
         \n\
         Email Body:\n\
         {}",
        email_text
    )
}

pub fn receipt_prompt(receipt_text: &str) -> String {
    format!(
        "Extract the following details from the transaction receipt:\n\
         - Transaction ID\n\
         - Transaction Amount\n\
         \n\
         Extracted Text:\n\
         {}",
        receipt_text
    )
}

pub struct UnitEnricher {
    text: Arc<dyn TextProvider>,
    ocr: Arc<dyn OcrEngine>,
    params: GenerationParams,
}

impl UnitEnricher {
    pub fn new(text: Arc<dyn TextProvider>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            text,
            ocr,
            params: GenerationParams {
                system_prompt: Some(SYSTEM_PROMPT.to_string()),
                ..Default::default()
            },
        }
    }

    /// Enrich every unit under `root`, sequentially, in enumeration order.
    pub async fn run(&self, root: &Path) -> Result<EnrichmentReport, AppError> {
        let units = list_units(root).map_err(|e| {
            AppError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to list units in {}: {}", root.display(), e),
            ))
        })?;

        info!(root = %root.display(), units = units.len(), "Starting enrichment batch");

        let mut report = EnrichmentReport::default();
        for unit in &units {
            report.outcomes.push(self.enrich_unit(unit).await);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Enrichment batch finished"
        );

        Ok(report)
    }

    #[instrument(skip(self, unit), fields(unit = %unit.id))]
    pub async fn enrich_unit(&self, unit: &UnitOfWork) -> EnrichmentOutcome {
        match self.try_enrich(unit).await {
            Ok(outcome) => {
                record_unit_outcome("enriched");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Unit enrichment failed");
                record_unit_outcome("failed");
                record_error("unit_io");
                EnrichmentOutcome::failed(&unit.id, e.to_string())
            }
        }
    }

    async fn try_enrich(&self, unit: &UnitOfWork) -> Result<EnrichmentOutcome, UnitError> {
        let mut record = match unit.read_record() {
            Ok(existing) => existing,
            Err(UnitError::RecordMissing(_)) => ExtractedRecord::default(),
            Err(UnitError::RecordInvalid { source, .. }) => {
                warn!(error = %source, "Existing output.json is invalid, resetting it");
                record_error("record_reset");
                ExtractedRecord::default()
            }
            Err(e) => return Err(e),
        };

        let mut degraded = Vec::new();

        if let Some(email_text) = unit.read_email_text()? {
            match self.ask(Source::EmailText, &email_prompt(&email_text)).await {
                Some(reply) => record.overlay(parse_reply(&reply, &ReplyField::EMAIL)),
                None => degraded.push(Source::EmailText),
            }
        } else {
            debug!("No email text in unit");
        }

        let image = first_receipt_image(unit)?;
        if let Some(path) = &image {
            match self.read_receipt(path).await {
                Ok(Some(receipt_text)) => {
                    match self.ask(Source::ReceiptImage, &receipt_prompt(&receipt_text)).await {
                        Some(reply) => record.overlay(parse_reply(&reply, &ReplyField::RECEIPT)),
                        None => degraded.push(Source::ReceiptImage),
                    }
                }
                Ok(None) => debug!("Receipt image contained no text"),
                Err(e) => {
                    warn!(error = %e, image = %path.display(), "OCR failed");
                    record_error("ocr_failed");
                    degraded.push(Source::ReceiptImage);
                }
            }
        }

        unit.write_record(&record)?;

        info!(
            username = record.username.as_deref().unwrap_or_default(),
            has_amount = record.transaction_amount.is_some(),
            degraded = degraded.len(),
            "Processed data saved to output.json"
        );

        Ok(EnrichmentOutcome {
            unit: unit.id.clone(),
            success: true,
            message: "Processed data saved to output.json".to_string(),
            record: Some(record),
            image: image
                .as_deref()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned()),
            degraded,
        })
    }

    /// OCR text with currency symbols removed, or `None` when nothing is left.
    async fn read_receipt(&self, path: &Path) -> Result<Option<String>, OcrError> {
        let raw = self.ocr.extract_text(path).await.inspect_err(|_| {
            record_ocr_run(self.ocr.name(), "error");
        })?;
        record_ocr_run(self.ocr.name(), "ok");

        let text = strip_currency_symbols(&raw);
        Ok((!text.trim().is_empty()).then_some(text))
    }

    /// Reply text for `prompt`, or `None` when the provider failed.
    async fn ask(&self, source: Source, prompt: &str) -> Option<String> {
        let provider = self.text.name();
        let timer = LLM_LATENCY.with_label_values(&[provider]).start_timer();
        let result = self.text.generate(prompt, &self.params).await;
        timer.observe_duration();

        match result {
            Ok(response) => {
                record_llm_request(
                    provider,
                    source.as_str(),
                    "ok",
                    (response.input_tokens, response.output_tokens),
                );
                debug!(source = source.as_str(), reply = ?response.text, "LLM reply received");
                Some(response.text.unwrap_or_default())
            }
            Err(e) => {
                warn!(source = source.as_str(), error = %e, "LLM request failed");
                record_llm_request(provider, source.as_str(), "error", (0, 0));
                record_error(e.kind());
                None
            }
        }
    }
}

/// First `.png`/`.jpg`/`.jpeg` attachment in lexical order.
fn first_receipt_image(unit: &UnitOfWork) -> Result<Option<PathBuf>, UnitError> {
    Ok(unit
        .attachments()?
        .into_iter()
        .find(|path| is_receipt_image(path)))
}
