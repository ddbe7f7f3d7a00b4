//! Common fixtures for pipeline workflow tests.

use enrichment_service::services::{MockOcr, MockTextProvider};
use reconciliation_service::services::{MemoryAccountStore, MemoryUnitLedger};
use std::sync::Arc;
use tempfile::TempDir;
use workflow_tests::{init_tracing, PipelineEngines, PipelineWorkspace};

/// A fresh workspace under a temporary root that lives as long as the guard.
pub fn setup() -> (TempDir, PipelineWorkspace) {
    init_tracing();
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let workspace = PipelineWorkspace::create(root.path()).expect("Failed to create workspace");
    (root, workspace)
}

/// Scripted engines around a shared in-memory store and ledger.
pub struct Harness {
    pub engines: PipelineEngines,
    pub text: Arc<MockTextProvider>,
    pub store: Arc<MemoryAccountStore>,
    pub ledger: Arc<MemoryUnitLedger>,
}

pub fn harness(text: MockTextProvider, ocr: MockOcr) -> Harness {
    let text = Arc::new(text);
    let store = Arc::new(MemoryAccountStore::new());
    let ledger = Arc::new(MemoryUnitLedger::new());
    let engines = PipelineEngines {
        text: text.clone(),
        ocr: Arc::new(ocr),
        store: store.clone(),
        ledger: Some(ledger.clone()),
    };
    Harness {
        engines,
        text,
        store,
        ledger,
    }
}

/// A payment notification with a plain-text body and a PNG receipt.
pub fn payment_message(username: &str, utr: &str, image_name: &str) -> String {
    format!(
        "From: Payments <payments@example.com>\r\n\
Subject: Payment from {username}\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Payment received. Username: {username} UTR: {utr}\r\n\
--XYZ\r\n\
Content-Type: image/png\r\n\
Content-Disposition: attachment; filename=\"{image_name}\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
--XYZ--\r\n"
    )
}

/// A notification with no attachment at all.
pub fn text_only_message(body: &str) -> String {
    format!(
        "From: Payments <payments@example.com>\r\n\
Subject: Payment notice\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
{body}\r\n"
    )
}
