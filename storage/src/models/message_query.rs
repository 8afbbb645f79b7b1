//! Filters for [`crate::MessageRepository::list`].

use serde::{Deserialize, Serialize};

/// All fields are optional; unset filters match every row. Results are newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQuery {
    /// Filter by Telegram user id.
    pub user_id: Option<i64>,
    /// Filter by chat id.
    pub chat_id: Option<i64>,
    /// Filter by message type (e.g. "text", "successful_payment").
    pub message_type: Option<String>,
    /// Filter by direction ("sent" or "received").
    pub direction: Option<String>,
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
}
