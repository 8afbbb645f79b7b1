//! One shared SQLite pool per database; the file is created on first open.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const FILE_POOL_SIZE: u32 = 8;

#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given database URL.
    ///
    /// Accepts a plain file path (`./game_bot.db`) or an sqlx URL (`sqlite://path`,
    /// `sqlite::memory:`). In-memory databases are pinned to one connection so every
    /// query sees the same schema and rows.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");
        let options = if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)?
        } else {
            SqliteConnectOptions::new().filename(database_url)
        }
        .create_if_missing(true)
        .foreign_keys(true);

        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(FILE_POOL_SIZE)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        info!(database_url, in_memory, "sqlite pool ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
