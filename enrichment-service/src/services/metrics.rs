//! Prometheus metrics for enrichment-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter_vec, CounterVec,
    HistogramVec, IntCounterVec,
};

/// Counter for processed units by outcome (enriched, failed).
pub static UNITS_PROCESSED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "enrichment_units_total",
        "Total number of units of work enriched",
        &["status"]
    )
    .expect("Failed to register UNITS_PROCESSED")
});

/// Counter for LLM requests by provider and outcome.
pub static LLM_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "enrichment_llm_requests_total",
        "Total LLM completion requests",
        &["provider", "purpose", "status"]
    )
    .expect("Failed to register LLM_REQUESTS")
});

/// Tokens consumed by LLM requests.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "enrichment_llm_tokens_total",
        "Total tokens processed by the LLM provider",
        &["provider", "type"]
    )
    .expect("Failed to register LLM_TOKENS")
});

/// Histogram for LLM request latency.
pub static LLM_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "enrichment_llm_latency_seconds",
        "LLM request latency in seconds",
        &["provider"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("Failed to register LLM_LATENCY")
});

/// Counter for OCR runs by engine and outcome.
pub static OCR_RUNS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "enrichment_ocr_runs_total",
        "Total OCR runs",
        &["engine", "status"]
    )
    .expect("Failed to register OCR_RUNS")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "enrichment_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&UNITS_PROCESSED);
    Lazy::force(&LLM_REQUESTS);
    Lazy::force(&LLM_TOKENS);
    Lazy::force(&LLM_LATENCY);
    Lazy::force(&OCR_RUNS);
    Lazy::force(&ERRORS);
}

pub fn record_unit_outcome(status: &str) {
    UNITS_PROCESSED.with_label_values(&[status]).inc();
}

/// Record a completed LLM request and its token usage.
pub fn record_llm_request(provider: &str, purpose: &str, status: &str, tokens: (i32, i32)) {
    LLM_REQUESTS
        .with_label_values(&[provider, purpose, status])
        .inc();
    let (input, output) = tokens;
    if input > 0 {
        LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(input as u64);
    }
    if output > 0 {
        LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(output as u64);
    }
}

pub fn record_ocr_run(engine: &str, status: &str) {
    OCR_RUNS.with_label_values(&[engine, status]).inc();
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
