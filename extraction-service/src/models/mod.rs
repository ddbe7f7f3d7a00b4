//! Domain models for extraction-service.

use serde::Serialize;

/// Result for one spooled message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    /// File name of the message in the spool.
    pub message: String,
    pub success: bool,
    /// Unit folder created for the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub body_written: bool,
    /// Attachment file names as written into the unit.
    pub attachments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ordered per-message outcomes of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub outcomes: Vec<ExtractionOutcome>,
}

impl ExtractionReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// Ids of the units created by this run.
    pub fn units(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.unit.as_deref())
            .collect()
    }
}
