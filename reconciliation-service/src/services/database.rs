//! PostgreSQL-backed account store for reconciliation-service.

use crate::models::AccountRecord;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{AccountStore, StoreError, UnitLedger};
use async_trait::async_trait;
use pipeline_core::error::AppError;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, FromRow)]
struct AccountRow {
    username: String,
    transaction_amount: String,
    utr: Option<String>,
    transaction_id: Option<String>,
    attributes: Json<BTreeMap<String, Value>>,
}

impl From<AccountRow> for AccountRecord {
    fn from(row: AccountRow) -> Self {
        Self {
            username: row.username,
            transaction_amount: row.transaction_amount,
            utr: row.utr,
            transaction_id: row.transaction_id,
            attributes: row.attributes.0,
        }
    }
}

/// Account store and unit ledger backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "reconciliation-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =========================================================================
// Account Record Operations
// =========================================================================

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self))]
    async fn get(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_account_record"])
            .start_timer();

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT username, transaction_amount, utr, transaction_id, attributes
            FROM account_records
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(row.map(AccountRecord::from))
    }

    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn insert(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_account_record"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO account_records (username, transaction_amount, utr, transaction_id, attributes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.username)
        .bind(&record.transaction_amount)
        .bind(&record.utr)
        .bind(&record.transaction_id)
        .bind(Json(&record.attributes))
        .execute(&self.pool)
        .await?;

        timer.observe_duration();
        info!("Account record inserted");

        Ok(())
    }

    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn replace(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["replace_account_record"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO account_records (username, transaction_amount, utr, transaction_id, attributes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO UPDATE
            SET transaction_amount = EXCLUDED.transaction_amount,
                utr = EXCLUDED.utr,
                transaction_id = EXCLUDED.transaction_id,
                attributes = EXCLUDED.attributes,
                updated_utc = NOW()
            "#,
        )
        .bind(&record.username)
        .bind(&record.transaction_amount)
        .bind(&record.utr)
        .bind(&record.transaction_id)
        .bind(Json(&record.attributes))
        .execute(&self.pool)
        .await?;

        timer.observe_duration();
        info!("Account record replaced");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1").execute(&self.pool).await?;

        timer.observe_duration();
        Ok(())
    }
}

// =========================================================================
// Consumed Unit Operations
// =========================================================================

#[async_trait]
impl UnitLedger for PostgresAccountStore {
    #[instrument(skip(self))]
    async fn is_consumed(&self, unit_id: &str) -> Result<bool, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["is_unit_consumed"])
            .start_timer();

        let consumed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM consumed_units WHERE unit_id = $1)",
        )
        .bind(unit_id)
        .fetch_one(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(consumed)
    }

    #[instrument(skip(self))]
    async fn mark_consumed(&self, unit_id: &str, username: &str) -> Result<(), StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_unit_consumed"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO consumed_units (unit_id, username)
            VALUES ($1, $2)
            ON CONFLICT (unit_id) DO NOTHING
            "#,
        )
        .bind(unit_id)
        .bind(username)
        .execute(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(())
    }
}
