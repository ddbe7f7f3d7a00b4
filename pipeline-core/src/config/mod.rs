use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings shared by every pipeline stage.
///
/// Loaded from an optional `configuration` file and `APP__*` environment
/// variables (e.g. `APP__ATTACHMENTS_DIR`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_attachments_dir() -> PathBuf {
    PathBuf::from("attachments")
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut loaded: Config = config.try_deserialize()?;

        // Unprefixed variables override the APP__ ones.
        if let Ok(dir) = env::var("ATTACHMENTS_DIR") {
            loaded.attachments_dir = PathBuf::from(dir);
        }
        if let Ok(environment) = env::var("ENVIRONMENT") {
            loaded.environment = environment;
        }

        Ok(loaded)
    }

    pub fn is_prod(&self) -> bool {
        self.environment == "prod"
    }
}

/// Logging, tracing and metrics settings common to all stages.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub metrics_textfile: Option<PathBuf>,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, service_version: &str) -> Self {
        Self {
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| default_service_name.to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| service_version.to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            metrics_textfile: env::var("METRICS_TEXTFILE")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Read an environment variable, falling back to `default` outside production.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Read and parse an optional environment variable, using `default` when it is
/// unset or unparsable.
pub fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean flag parsing that accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn get_env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(val) => parse_flag(&val).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
