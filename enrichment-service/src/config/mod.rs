//! Configuration module for enrichment-service.

use crate::services::providers::openai::OPENAI_API_BASE;
use pipeline_core::config::{self as core_config, get_env, get_env_parsed};
use pipeline_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub common: core_config::Config,
    pub telemetry: core_config::TelemetryConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub enum LlmConfig {
    OpenAi {
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    },
    Mock,
}

#[derive(Debug, Clone)]
pub enum OcrConfig {
    Tesseract { bin: PathBuf },
    Mock,
}

impl LlmConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Mock => "mock",
        }
    }
}

impl OcrConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tesseract { .. } => "tesseract",
            Self::Mock => "mock",
        }
    }
}

impl EnrichmentConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let telemetry =
            core_config::TelemetryConfig::from_env("enrichment-service", env!("CARGO_PKG_VERSION"));
        let is_prod = common.is_prod();

        let llm = match selector("LLM_PROVIDER", "openai").as_str() {
            "openai" => LlmConfig::OpenAi {
                api_key: get_env("OPENAI_API_KEY", None, false)?,
                model: get_env("OPENAI_MODEL", Some("gpt-3.5-turbo"), is_prod)?,
                base_url: get_env("OPENAI_BASE_URL", Some(OPENAI_API_BASE), is_prod)?,
                timeout: Duration::from_secs(get_env_parsed("LLM_TIMEOUT_SECS", 120)),
            },
            "mock" => LlmConfig::Mock,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Unknown LLM_PROVIDER '{}', expected 'openai' or 'mock'",
                    other
                )))
            }
        };

        let ocr = match selector("OCR_ENGINE", "tesseract").as_str() {
            "tesseract" => OcrConfig::Tesseract {
                bin: PathBuf::from(get_env("TESSERACT_BIN", Some("tesseract"), false)?),
            },
            "mock" => OcrConfig::Mock,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Unknown OCR_ENGINE '{}', expected 'tesseract' or 'mock'",
                    other
                )))
            }
        };

        Ok(Self {
            common,
            telemetry,
            llm,
            ocr,
        })
    }
}

fn selector(key: &str, default: &str) -> String {
    env::var(key)
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_else(|_| default.to_string())
}
