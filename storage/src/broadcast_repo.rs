//! Broadcast repository: job rows and their delivery progress.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::{BroadcastRecord, BroadcastStatus};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct BroadcastRepository {
    pool_manager: SqlitePoolManager,
}

impl BroadcastRepository {
    pub(crate) fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Creates a `Pending` job and returns it.
    pub async fn create(
        &self,
        text: &str,
        created_by: i64,
        total_targets: i64,
    ) -> Result<BroadcastRecord, StorageError> {
        if text.trim().is_empty() {
            return Err(StorageError::InvalidInput(
                "broadcast text is empty".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, BroadcastRecord>(
            r#"
            INSERT INTO broadcasts (text, created_by, status, total_targets, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(text)
        .bind(created_by)
        .bind(BroadcastStatus::Pending)
        .bind(total_targets)
        .bind(Utc::now())
        .fetch_one(self.pool_manager.pool())
        .await?;

        info!(
            broadcast_id = record.id,
            created_by = created_by,
            total_targets = total_targets,
            "Broadcast created"
        );
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<BroadcastRecord>, StorageError> {
        let record = sqlx::query_as::<_, BroadcastRecord>("SELECT * FROM broadcasts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(record)
    }

    /// Pending or running jobs, oldest first; used to resume after restart.
    pub async fn list_unfinished(&self) -> Result<Vec<BroadcastRecord>, StorageError> {
        let records = sqlx::query_as::<_, BroadcastRecord>(
            "SELECT * FROM broadcasts WHERE status IN ('pending', 'running') ORDER BY id ASC",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    /// Newest jobs first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<BroadcastRecord>, StorageError> {
        let records = sqlx::query_as::<_, BroadcastRecord>(
            "SELECT * FROM broadcasts ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    /// Moves a pending (or resumed running) job to `Running`. Returns false if it is terminal.
    pub async fn mark_running(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE broadcasts SET status = 'running', started_at = COALESCE(started_at, ?)
            WHERE id = ? AND status IN ('pending', 'running')
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Commits one page of delivery: advances the cursor and adds the counters.
    pub async fn record_progress(
        &self,
        id: i64,
        cursor_user_id: i64,
        sent_delta: i64,
        failed_delta: i64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE broadcasts
            SET cursor_user_id = ?, sent = sent + ?, failed = failed + ?
            WHERE id = ?
            "#,
        )
        .bind(cursor_user_id)
        .bind(sent_delta)
        .bind(failed_delta)
        .bind(id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    /// Moves a non-terminal job to `status`. Returns false if the job was already terminal
    /// (e.g. cancelled while the last page was being delivered).
    pub async fn finish(&self, id: i64, status: BroadcastStatus) -> Result<bool, StorageError> {
        if !status.is_terminal() {
            return Err(StorageError::InvalidInput(format!(
                "finish requires a terminal status, got {}",
                status
            )));
        }
        let result = sqlx::query(
            r#"
            UPDATE broadcasts SET status = ?, finished_at = ?
            WHERE id = ? AND status IN ('pending', 'running')
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool_manager.pool())
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            info!(broadcast_id = id, status = %status, "Broadcast finished");
        }
        Ok(changed)
    }

    /// Cancels a pending or running job. Returns false if unknown or already terminal.
    pub async fn cancel(&self, id: i64) -> Result<bool, StorageError> {
        self.finish(id, BroadcastStatus::Cancelled).await
    }
}
