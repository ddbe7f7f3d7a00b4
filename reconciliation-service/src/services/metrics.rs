//! Prometheus metrics for reconciliation-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    HistogramVec,
};

/// Counter for processed units by outcome (reconciled, skipped, failed).
pub static UNITS_PROCESSED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "reconciliation_units_total",
        "Total number of units of work processed",
        &["status"]
    )
    .expect("Failed to register UNITS_PROCESSED")
});

/// Counter for account writes by action (created, updated).
pub static RECONCILIATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "reconciliation_operations_total",
        "Total number of account records created or updated",
        &["action"]
    )
    .expect("Failed to register RECONCILIATIONS")
});

/// Sum of all amounts added to balances.
pub static AMOUNT_RECONCILED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "reconciliation_amount_total",
        "Sum of transaction amounts added to account balances"
    )
    .expect("Failed to register AMOUNT_RECONCILED")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "reconciliation_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "reconciliation_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&UNITS_PROCESSED);
    Lazy::force(&RECONCILIATIONS);
    Lazy::force(&AMOUNT_RECONCILED);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&ERRORS);
}

/// Record a processed unit.
pub fn record_unit_outcome(status: &str) {
    UNITS_PROCESSED.with_label_values(&[status]).inc();
}

/// Record an account write and the amount it contributed.
pub fn record_reconciliation(action: &str, amount: f64) {
    RECONCILIATIONS.with_label_values(&[action]).inc();
    if amount.is_finite() && amount > 0.0 {
        AMOUNT_RECONCILED.inc_by(amount);
    }
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
