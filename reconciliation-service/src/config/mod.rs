//! Configuration module for reconciliation-service.

use pipeline_core::config::{self as core_config, get_env, get_env_flag, get_env_parsed};
use pipeline_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    pub common: core_config::Config,
    pub telemetry: core_config::TelemetryConfig,
    pub store: StoreBackend,
    /// Skip units already recorded in the consumed-unit ledger.
    pub dedupe_units: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Where account records live.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Postgres(DatabaseConfig),
    /// Process-local map; balances vanish when the run ends.
    Memory,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl ReconciliationConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let telemetry = core_config::TelemetryConfig::from_env(
            "reconciliation-service",
            env!("CARGO_PKG_VERSION"),
        );

        let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres(DatabaseConfig {
                url: get_env("DATABASE_URL", None, common.is_prod())?,
                max_connections: get_env_parsed("DATABASE_MAX_CONNECTIONS", 10),
                min_connections: get_env_parsed("DATABASE_MIN_CONNECTIONS", 2),
            }),
            "memory" => {
                if common.is_prod() {
                    return Err(AppError::ConfigError(anyhow::anyhow!(
                        "STORE_BACKEND=memory is not allowed in production"
                    )));
                }
                StoreBackend::Memory
            }
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Unknown STORE_BACKEND '{}', expected 'postgres' or 'memory'",
                    other
                )))
            }
        };

        Ok(Self {
            common,
            telemetry,
            store,
            dedupe_units: get_env_flag("RECONCILE_DEDUPE_UNITS", true),
        })
    }
}
