//! Prometheus metrics for extraction-service.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

/// Counter for spooled messages by outcome (extracted, failed).
pub static MESSAGES_PROCESSED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "extraction_messages_total",
        "Total number of spooled messages processed",
        &["status"]
    )
    .expect("Failed to register MESSAGES_PROCESSED")
});

/// Counter for attachment files written into units.
pub static ATTACHMENTS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "extraction_attachments_total",
        "Total number of attachments written into units"
    )
    .expect("Failed to register ATTACHMENTS_WRITTEN")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "extraction_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&MESSAGES_PROCESSED);
    Lazy::force(&ATTACHMENTS_WRITTEN);
    Lazy::force(&ERRORS);
}

pub fn record_message_outcome(status: &str) {
    MESSAGES_PROCESSED.with_label_values(&[status]).inc();
}

pub fn record_attachments(count: usize) {
    ATTACHMENTS_WRITTEN.inc_by(count as u64);
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
