//! User repository: the registry of private-chat users that broadcasts target.

use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub(crate) fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts a new user or refreshes an existing one.
    ///
    /// On conflict the profile fields and `last_seen_at` are updated and `is_blocked` is
    /// cleared (the user could only write if they unblocked the bot). `is_active` and
    /// `first_seen_at` are left as stored.
    pub async fn upsert(&self, user: &UserRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name, is_active, is_blocked, first_seen_at, last_seen_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                is_blocked = 0,
                last_seen_at = excluded.last_seen_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.is_blocked)
        .bind(user.first_seen_at)
        .bind(user.last_seen_at)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(user_id = user.user_id, "Upserted user");
        Ok(())
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    /// Sets the broadcast subscription flag. Returns false when the user is unknown.
    pub async fn set_active(&self, user_id: i64, active: bool) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(active)
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        info!(user_id = user_id, active = active, "User subscription changed");
        Ok(result.rows_affected() > 0)
    }

    /// Marks a user as having blocked the bot; they are skipped by broadcasts until they write again.
    pub async fn mark_blocked(&self, user_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE users SET is_blocked = 1 WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        info!(user_id = user_id, "User marked as blocked");
        Ok(result.rows_affected() > 0)
    }

    /// Active, unblocked users with `user_id > cursor`, ordered by user id (keyset pagination).
    pub async fn list_active_after(
        &self,
        cursor: i64,
        limit: i64,
    ) -> Result<Vec<UserRecord>, StorageError> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT * FROM users
            WHERE is_active = 1 AND is_blocked = 0 AND user_id > ?
            ORDER BY user_id ASC
            LIMIT ?
            "#,
        )
        .bind(cursor)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(users)
    }

    pub async fn count_active(&self) -> Result<i64, StorageError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_active = 1 AND is_blocked = 0")
                .fetch_one(self.pool_manager.pool())
                .await?;
        Ok(count.0)
    }
}
