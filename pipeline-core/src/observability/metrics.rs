//! Prometheus text exposition for batch processes.
//!
//! The stages run to completion and exit, so there is no scrape endpoint.
//! Instead the default registry is dumped to a file picked up by the
//! node-exporter textfile collector.

use crate::error::AppError;
use prometheus::{Encoder, TextEncoder};
use std::fs;
use std::path::Path;

/// Get all registered metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Metrics are not UTF-8: {}", e)))
}

/// Write the registry to `path`, replacing it atomically via a sibling temp file.
pub fn write_metrics_textfile(path: &Path) -> Result<(), AppError> {
    let body = gather_metrics()?;
    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "Metrics textfile written");
    Ok(())
}
