//! Row type of the `messages` log table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DIRECTION_RECEIVED: &str = "received";
pub const DIRECTION_SENT: &str = "sent";

/// One logged update or bot reply.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: String,
    pub user_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// "text", "successful_payment" or "other".
    pub message_type: String,
    pub content: String,
    /// [`DIRECTION_RECEIVED`] or [`DIRECTION_SENT`].
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    fn with_direction(
        user_id: i64,
        chat_id: i64,
        message_type: impl Into<String>,
        content: impl Into<String>,
        direction: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            chat_id,
            username: None,
            first_name: None,
            last_name: None,
            message_type: message_type.into(),
            content: content.into(),
            direction: direction.to_string(),
            created_at: Utc::now(),
        }
    }

    /// An inbound message from `user_id` in `chat_id`.
    pub fn received(
        user_id: i64,
        chat_id: i64,
        message_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_direction(user_id, chat_id, message_type, content, DIRECTION_RECEIVED)
    }

    /// A text reply the bot sent into `chat_id` while serving `user_id`.
    pub fn sent(user_id: i64, chat_id: i64, content: impl Into<String>) -> Self {
        Self::with_direction(user_id, chat_id, "text", content, DIRECTION_SENT)
    }

    /// Attaches the sender's profile snapshot.
    pub fn with_profile(
        mut self,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        self.username = username;
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    pub fn is_received(&self) -> bool {
        self.direction == DIRECTION_RECEIVED
    }
}
