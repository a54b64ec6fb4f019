//! Database layer for the review manager
//!
//! Persists teams, users, pull requests and reviewer assignments in SQLite
//! and exposes them to the assignment engine as transactional stores.

pub mod error;
pub mod repos;
pub mod transaction;

use revman_core::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::debug;

pub use error::{DbError, Result};
pub use transaction::{SqliteTransaction, SqliteTransactions};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`, creating and migrating it if needed
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_path = config.path.as_path();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        debug!(path = %db_path.display(), "Database ready");
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a transaction runner for the assignment engine
    pub fn transactions(&self) -> SqliteTransactions {
        SqliteTransactions::new(self.pool.clone())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
