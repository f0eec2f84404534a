use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreError;

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub sqlite_path: String,
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn new(sqlite_path: impl Into<String>) -> Self {
        Self {
            sqlite_path: sqlite_path.into(),
            max_connections: 5,
        }
    }
}

/// Process-wide handle to the tracking database.
///
/// Holds the connection pool; opened once at startup and dropped at
/// shutdown. Sessions are handed out one per [`crate::UnitOfWork`] scope.
#[derive(Debug, Clone)]
pub struct TrackingStore {
    pool: SqlitePool,
}

impl TrackingStore {
    /// Open the pool, creating the database file when missing, and bring
    /// the schema up to date.
    ///
    /// Foreign keys are switched on at connection time; the cascade from
    /// sms_transfers to sms_documents depends on it.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let uri = normalize_sqlite_uri(&config.sqlite_path);
        let options = SqliteConnectOptions::from_str(&uri)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_SQL.split(';') {
            let sql = statement.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql).execute(&self.pool).await?;
        }
        info!("tracking sqlite schema ready");
        Ok(())
    }
}

fn normalize_sqlite_uri(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite://{raw}")
    }
}
