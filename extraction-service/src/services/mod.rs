//! Services module for extraction-service.

pub mod extractor;
pub mod metrics;
pub mod mime;
pub mod spool;

pub use extractor::{ExtractionError, MailExtractor};
pub use metrics::init_metrics;
pub use mime::{split_message, Attachment, MessageParts};
pub use spool::{mark_processed, scan_spool, PROCESSED_DIR};
