//! Database: one SQLite pool shared by every repository, plus schema setup and stats.

use tracing::{info, instrument};

use crate::broadcast_repo::BroadcastRepository;
use crate::error::StorageError;
use crate::game_repo::GameRepository;
use crate::message_repo::MessageRepository;
use crate::models::BotStats;
use crate::payment_repo::PaymentRepository;
use crate::sqlite_pool::SqlitePoolManager;
use crate::user_repo::UserRepository;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_blocked INTEGER NOT NULL DEFAULT 0,
    first_seen_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_active ON users(is_active, is_blocked, user_id);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL,
    chat_id INTEGER NOT NULL,
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    message_type TEXT NOT NULL,
    content TEXT NOT NULL,
    direction TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages(user_id);
CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages(chat_id);
CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);

CREATE TABLE IF NOT EXISTS game_saves (
    user_id INTEGER NOT NULL,
    slot TEXT NOT NULL,
    data TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, slot)
);

CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL,
    payload TEXT NOT NULL,
    currency TEXT NOT NULL,
    total_amount INTEGER NOT NULL,
    telegram_payment_charge_id TEXT NOT NULL UNIQUE,
    provider_payment_charge_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    refunded_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_payments_user_id ON payments(user_id);

CREATE TABLE IF NOT EXISTS broadcasts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    created_by INTEGER NOT NULL,
    status TEXT NOT NULL,
    total_targets INTEGER NOT NULL DEFAULT 0,
    sent INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    cursor_user_id INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    started_at TEXT,
    finished_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_broadcasts_status ON broadcasts(status);
"#;

/// Entry point to persistence. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Database {
    pool_manager: SqlitePoolManager,
}

impl Database {
    /// Opens (creating if missing) the database at `database_url` and creates tables.
    #[instrument]
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let db = Self { pool_manager };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating database tables if not exist");
        sqlx::query(SCHEMA)
            .execute(self.pool_manager.pool())
            .await?;
        info!("Database tables created successfully");
        Ok(())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool_manager.clone())
    }

    pub fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.pool_manager.clone())
    }

    pub fn games(&self) -> GameRepository {
        GameRepository::new(self.pool_manager.clone())
    }

    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool_manager.clone())
    }

    pub fn broadcasts(&self) -> BroadcastRepository {
        BroadcastRepository::new(self.pool_manager.clone())
    }

    /// Counts across all tables in one pass.
    pub async fn stats(&self) -> Result<BotStats, StorageError> {
        let pool = self.pool_manager.pool();

        let (total_users, active_users, blocked_users): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN is_active = 1 AND is_blocked = 0 THEN 1 ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN is_blocked = 1 THEN 1 ELSE 0 END), 0)
            FROM users
            "#,
        )
        .fetch_one(pool)
        .await?;

        let (total_messages, received_messages, sent_messages): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN direction = 'received' THEN 1 ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN direction = 'sent' THEN 1 ELSE 0 END), 0)
            FROM messages
            "#,
        )
        .fetch_one(pool)
        .await?;

        let game_saves: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM game_saves")
            .fetch_one(pool)
            .await?;

        let (payments, stars_received): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_amount), 0) FROM payments WHERE status = 'paid'",
        )
        .fetch_one(pool)
        .await?;

        let broadcasts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM broadcasts")
            .fetch_one(pool)
            .await?;

        Ok(BotStats {
            total_users,
            active_users,
            blocked_users,
            total_messages,
            received_messages,
            sent_messages,
            game_saves: game_saves.0,
            payments,
            stars_received,
            broadcasts: broadcasts.0,
        })
    }
}
