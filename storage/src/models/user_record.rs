//! Known bot user; maps to the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user who has written to the bot in a private chat.
///
/// `is_active` is the broadcast subscription (/start, /stop); `is_blocked` is set when
/// Telegram reports the user blocked the bot and cleared when they write again.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_blocked: bool,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl UserRecord {
    /// New active, unblocked user seen now.
    pub fn new(
        user_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            first_name,
            last_name,
            is_active: true,
            is_blocked: false,
            first_seen_at: now,
            last_seen_at: now,
        }
    }
}
