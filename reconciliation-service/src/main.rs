//! Reconciliation Service entry point.

use reconciliation_service::config::ReconciliationConfig;
use reconciliation_service::startup::Application;

use pipeline_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = ReconciliationConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize tracing
    let telemetry = &config.telemetry;
    init_tracing(
        &telemetry.service_name,
        &telemetry.log_level,
        telemetry.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = %telemetry.service_version,
        store_backend = config.store.name(),
        dedupe_units = config.dedupe_units,
        attachments_dir = %config.common.attachments_dir.display(),
        "Starting reconciliation-service"
    );

    // Build and run application
    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        shutdown_tracing();
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    let report = app.run().await.map_err(|e| {
        tracing::error!(error = %e, "Reconciliation run failed");
        shutdown_tracing();
        std::io::Error::other(format!("Reconciliation error: {}", e))
    })?;

    for outcome in &report.outcomes {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!(error = %e, unit = %outcome.unit, "Failed to encode outcome"),
        }
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        retryable = ?report.retryable_units(),
        "Reconciliation run complete"
    );

    shutdown_tracing();
    Ok(())
}
