//! Domain models for enrichment-service.

use pipeline_core::ExtractedRecord;
use serde::Serialize;

/// Which half of a unit produced fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    EmailText,
    ReceiptImage,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailText => "email_text",
            Self::ReceiptImage => "receipt_image",
        }
    }
}

/// Result for one unit of work in an enrichment batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentOutcome {
    pub unit: String,
    pub success: bool,
    pub message: String,
    /// Record as written to `output.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ExtractedRecord>,
    /// Receipt image picked for OCR, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Halves whose extraction failed; their fields kept previous values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Source>,
}

impl EnrichmentOutcome {
    pub fn failed(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            success: false,
            message: message.into(),
            record: None,
            image: None,
            degraded: Vec::new(),
        }
    }
}

/// Ordered per-unit outcomes of one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentReport {
    pub outcomes: Vec<EnrichmentOutcome>,
}

impl EnrichmentReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}
