//! Game save repository: opaque per-user slots with a version counter.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::GameSave;
use crate::sqlite_pool::SqlitePoolManager;

/// Longest accepted slot name.
pub const MAX_SLOT_LEN: usize = 32;
/// Largest accepted save payload, in bytes.
pub const MAX_GAME_DATA_BYTES: usize = 4096;

/// Slot names are 1..=32 characters of `[A-Za-z0-9_-]`.
pub fn validate_slot(slot: &str) -> Result<(), StorageError> {
    if slot.is_empty() || slot.len() > MAX_SLOT_LEN {
        return Err(StorageError::InvalidInput(format!(
            "slot name must be 1-{} characters",
            MAX_SLOT_LEN
        )));
    }
    if !slot
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StorageError::InvalidInput(
            "slot name may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct GameRepository {
    pool_manager: SqlitePoolManager,
}

impl GameRepository {
    pub(crate) fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Writes `data` into the user's slot and returns the stored row.
    /// A new slot starts at version 1; each overwrite bumps the version.
    pub async fn save(
        &self,
        user_id: i64,
        slot: &str,
        data: &str,
    ) -> Result<GameSave, StorageError> {
        validate_slot(slot)?;
        if data.is_empty() {
            return Err(StorageError::InvalidInput("save data is empty".to_string()));
        }
        if data.len() > MAX_GAME_DATA_BYTES {
            return Err(StorageError::InvalidInput(format!(
                "save data exceeds {} bytes",
                MAX_GAME_DATA_BYTES
            )));
        }

        let now = Utc::now();
        let saved = sqlx::query_as::<_, GameSave>(
            r#"
            INSERT INTO game_saves (user_id, slot, data, version, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            ON CONFLICT(user_id, slot) DO UPDATE SET
                data = excluded.data,
                version = game_saves.version + 1,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(slot)
        .bind(data)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool_manager.pool())
        .await?;

        info!(
            user_id = user_id,
            slot = %slot,
            version = saved.version,
            bytes = data.len(),
            "Game saved"
        );
        Ok(saved)
    }

    pub async fn load(&self, user_id: i64, slot: &str) -> Result<Option<GameSave>, StorageError> {
        validate_slot(slot)?;
        let save = sqlx::query_as::<_, GameSave>(
            "SELECT * FROM game_saves WHERE user_id = ? AND slot = ?",
        )
        .bind(user_id)
        .bind(slot)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        debug!(user_id = user_id, slot = %slot, found = save.is_some(), "Game loaded");
        Ok(save)
    }

    /// All of a user's saves, ordered by slot name.
    pub async fn list_slots(&self, user_id: i64) -> Result<Vec<GameSave>, StorageError> {
        let saves = sqlx::query_as::<_, GameSave>(
            "SELECT * FROM game_saves WHERE user_id = ? ORDER BY slot ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(saves)
    }

    /// Removes a slot; returns true if it existed.
    pub async fn delete(&self, user_id: i64, slot: &str) -> Result<bool, StorageError> {
        validate_slot(slot)?;
        let result = sqlx::query("DELETE FROM game_saves WHERE user_id = ? AND slot = ?")
            .bind(user_id)
            .bind(slot)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
