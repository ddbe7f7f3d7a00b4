//! Application startup and lifecycle management.

use crate::config::{EnrichmentConfig, LlmConfig, OcrConfig};
use crate::models::EnrichmentReport;
use crate::services::{
    init_metrics, MockOcr, MockTextProvider, OcrEngine, OpenAiChatProvider, OpenAiConfig,
    TextProvider, TesseractOcr, UnitEnricher,
};
use pipeline_core::error::AppError;
use pipeline_core::observability::write_metrics_textfile;
use std::path::PathBuf;
use std::sync::Arc;

/// One enrichment batch over the attachments root.
pub struct Application {
    attachments_dir: PathBuf,
    metrics_textfile: Option<PathBuf>,
    text: Arc<dyn TextProvider>,
    enricher: UnitEnricher,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: EnrichmentConfig) -> Result<Self, AppError> {
        init_metrics();

        let text: Arc<dyn TextProvider> = match &config.llm {
            LlmConfig::OpenAi {
                api_key,
                model,
                base_url,
                timeout,
            } => {
                let provider = OpenAiChatProvider::new(OpenAiConfig {
                    api_key: api_key.clone(),
                    model: model.clone(),
                    base_url: base_url.clone(),
                    timeout: *timeout,
                })
                .map_err(|e| AppError::ProviderError(e.to_string()))?;
                Arc::new(provider)
            }
            LlmConfig::Mock => {
                tracing::warn!("Using mock LLM provider; replies carry no fields");
                Arc::new(MockTextProvider::new().with_fallback(""))
            }
        };

        let ocr: Arc<dyn OcrEngine> = match &config.ocr {
            OcrConfig::Tesseract { bin } => Arc::new(TesseractOcr::new(bin.clone())),
            OcrConfig::Mock => {
                tracing::warn!("Using mock OCR engine; receipts yield no text");
                Arc::new(MockOcr::new().with_fallback(""))
            }
        };

        let mut app = Self::with_engines(config.common.attachments_dir.clone(), text, ocr);
        app.metrics_textfile = config.telemetry.metrics_textfile.clone();
        app.health_check().await?;
        Ok(app)
    }

    /// Assemble an application around already-built engines.
    pub fn with_engines(
        attachments_dir: PathBuf,
        text: Arc<dyn TextProvider>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            attachments_dir,
            metrics_textfile: None,
            enricher: UnitEnricher::new(text.clone(), ocr),
            text,
        }
    }

    /// Fail fast when the text provider cannot be reached.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.text.health_check().await.map_err(|e| {
            tracing::error!(provider = self.text.name(), error = %e, "Text provider health check failed");
            AppError::ProviderError(format!("{} health check failed: {}", self.text.name(), e))
        })?;
        tracing::info!(provider = self.text.name(), "Text provider is healthy");
        Ok(())
    }

    /// Run the batch to completion.
    pub async fn run(self) -> Result<EnrichmentReport, AppError> {
        tracing::info!(
            service = "enrichment-service",
            version = env!("CARGO_PKG_VERSION"),
            attachments_dir = %self.attachments_dir.display(),
            "Starting enrichment run"
        );

        let result = self.enricher.run(&self.attachments_dir).await;

        if let Some(path) = &self.metrics_textfile {
            if let Err(e) = write_metrics_textfile(path) {
                tracing::warn!(error = %e, path = %path.display(), "Failed to write metrics textfile");
            }
        }

        result
    }
}
