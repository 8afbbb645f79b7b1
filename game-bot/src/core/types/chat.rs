//! Chat identity type for core messages.

use serde::{Deserialize, Serialize};

/// Chat (private, group, channel) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

impl Chat {
    /// The private chat with a user; Telegram uses the user id as its chat id.
    pub fn private(user_id: i64) -> Self {
        Self {
            id: user_id,
            chat_type: "private".to_string(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.chat_type == "private"
    }
}
