//! Extraction Service entry point.

use extraction_service::config::ExtractionConfig;
use extraction_service::startup::Application;

use pipeline_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = ExtractionConfig::from_env().map_err(|e| {
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
        spool_dir = %config.spool_dir.display(),
        attachments_dir = %config.common.attachments_dir.display(),
        "Starting extraction-service"
    );

    let app = Application::build(config).map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        shutdown_tracing();
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    // Message parsing and unit writes are blocking file work.
    let report = tokio::task::spawn_blocking(move || app.run())
        .await
        .map_err(|e| std::io::Error::other(format!("Extraction task failed: {}", e)))?
        .map_err(|e| {
            tracing::error!(error = %e, "Extraction run failed");
            shutdown_tracing();
            std::io::Error::other(format!("Extraction error: {}", e))
        })?;

    for outcome in &report.outcomes {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                tracing::warn!(error = %e, file = %outcome.message, "Failed to encode outcome")
            }
        }
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        units = report.units().len(),
        "Extraction run complete"
    );

    shutdown_tracing();
    Ok(())
}
