//! Enrichment Service entry point.

use enrichment_service::config::EnrichmentConfig;
use enrichment_service::startup::Application;

use pipeline_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = EnrichmentConfig::from_env().map_err(|e| {
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
        llm_provider = config.llm.name(),
        ocr_engine = config.ocr.name(),
        attachments_dir = %config.common.attachments_dir.display(),
        "Starting enrichment-service"
    );

    // Build and run application
    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        shutdown_tracing();
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    let report = app.run().await.map_err(|e| {
        tracing::error!(error = %e, "Enrichment run failed");
        shutdown_tracing();
        std::io::Error::other(format!("Enrichment error: {}", e))
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
        "Enrichment run complete"
    );

    shutdown_tracing();
    Ok(())
}
