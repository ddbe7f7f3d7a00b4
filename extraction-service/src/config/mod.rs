//! Configuration module for extraction-service.

use pipeline_core::config::{self as core_config, get_env};
use pipeline_core::error::AppError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub common: core_config::Config,
    pub telemetry: core_config::TelemetryConfig,
    /// Directory holding `*.eml` files waiting to be extracted.
    pub spool_dir: PathBuf,
}

impl ExtractionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let telemetry =
            core_config::TelemetryConfig::from_env("extraction-service", env!("CARGO_PKG_VERSION"));
        let spool_dir = PathBuf::from(get_env("MAIL_SPOOL_DIR", Some("mail"), common.is_prod())?);

        Ok(Self {
            common,
            telemetry,
            spool_dir,
        })
    }
}
