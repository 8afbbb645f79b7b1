//! Message log: every received update and every text reply the bot sends.

use crate::error::StorageError;
use crate::models::{MessageQuery, MessageRecord};
use crate::sqlite_pool::SqlitePoolManager;
use chrono::{Duration, Utc};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

/// Upper bound applied to every caller-supplied limit.
const MAX_PAGE: i64 = 1000;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

/// Escapes `%`, `_` and the escape char itself so the keyword matches literally.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl MessageRepository {
    pub(crate) fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn save(&self, record: &MessageRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO messages \
             (id, user_id, chat_id, username, first_name, last_name, message_type, content, direction, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.user_id)
        .bind(record.chat_id)
        .bind(&record.username)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.message_type)
        .bind(&record.content)
        .bind(&record.direction)
        .bind(record.created_at)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(id = %record.id, user_id = record.user_id, direction = %record.direction, "message logged");
        Ok(())
    }

    /// Rows matching every set filter in `query`, newest first.
    pub async fn list(&self, query: &MessageQuery) -> Result<Vec<MessageRecord>, StorageError> {
        let mut sql: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM messages WHERE 1=1");

        if let Some(user_id) = query.user_id {
            sql.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(chat_id) = query.chat_id {
            sql.push(" AND chat_id = ").push_bind(chat_id);
        }
        if let Some(message_type) = &query.message_type {
            sql.push(" AND message_type = ").push_bind(message_type.as_str());
        }
        if let Some(direction) = &query.direction {
            sql.push(" AND direction = ").push_bind(direction.as_str());
        }
        sql.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit.unwrap_or(MAX_PAGE).clamp(0, MAX_PAGE));

        let rows = sql
            .build_query_as::<MessageRecord>()
            .fetch_all(self.pool_manager.pool())
            .await?;
        debug!(rows = rows.len(), "message log listed");
        Ok(rows)
    }

    pub async fn find(&self, id: &str) -> Result<Option<MessageRecord>, StorageError> {
        Ok(
            sqlx::query_as::<_, MessageRecord>("SELECT * FROM messages WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool_manager.pool())
                .await?,
        )
    }

    /// The latest `limit` rows of one chat, newest first.
    pub async fn recent_in_chat(
        &self,
        chat_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        self.list(&MessageQuery {
            chat_id: Some(chat_id),
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }

    /// Case-insensitive (ASCII) substring search over message content.
    pub async fn search(
        &self,
        keyword: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let rows = sqlx::query_as::<_, MessageRecord>(
            "SELECT * FROM messages WHERE content LIKE ? ESCAPE '\\' \
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(like_pattern(keyword))
        .bind(limit.clamp(0, MAX_PAGE))
        .fetch_all(self.pool_manager.pool())
        .await?;

        debug!(keyword, rows = rows.len(), "message log searched");
        Ok(rows)
    }

    /// Drops rows older than `days` days and returns how many went.
    pub async fn delete_older_than(&self, days: u32) -> Result<u64, StorageError> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let deleted = sqlx::query("DELETE FROM messages WHERE created_at < ?")
            .bind(cutoff)
            .execute(self.pool_manager.pool())
            .await?
            .rows_affected();

        info!(deleted, days, "message log pruned");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("level"), "%level%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
