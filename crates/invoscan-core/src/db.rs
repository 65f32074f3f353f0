//! PostgreSQL persistence: dedup lookups and conflict-ignoring inserts.
//!
//! One pool is created at startup and owned for the process lifetime; every
//! lookup and insert borrows it. The unique key on `filename` is the
//! concurrency safety net: even if two processes raced, at most one row per
//! filename can exist.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::PostgresConfig;
use crate::error::DbError;
use crate::models::InvoiceRecord;

/// Persistence interface for invoice records.
///
/// `exists` failures must propagate: a file whose prior state cannot be
/// determined is skipped for the pass, never treated as new.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup against the unique business key.
    async fn exists(&self, filename: &str) -> Result<bool, DbError>;

    /// Insert with insert-or-ignore-on-key-conflict semantics. Returns
    /// whether a new row was written; a conflict is a silent `false`.
    async fn insert(&self, record: &InvoiceRecord) -> Result<bool, DbError>;
}

/// PostgreSQL-backed record store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool using the given config. The schema is assumed to be
    /// present already; reconciliation is a one-time deployment step.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await
            .map_err(DbError::Connect)?;
        info!("PostgreSQL connected: {}/{}", config.host, config.database);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn exists(&self, filename: &str) -> Result<bool, DbError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM invoices_ocr_data WHERE filename = $1)",
        )
        .bind(filename)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::Lookup)
    }

    async fn insert(&self, record: &InvoiceRecord) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT INTO invoices_ocr_data \
             (filename, raw_text, ocr_status, parsed_date, supplier, total_sum, source_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (filename) DO NOTHING",
        )
        .bind(&record.filename)
        .bind(&record.raw_text)
        .bind(record.ocr_status.as_str())
        .bind(&record.parsed_date)
        .bind(&record.supplier)
        .bind(&record.total_sum)
        .bind(&record.source_path)
        .execute(&self.pool)
        .await
        .map_err(DbError::Insert)?;

        Ok(result.rows_affected() > 0)
    }
}
