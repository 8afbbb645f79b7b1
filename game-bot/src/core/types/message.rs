//! Inbound message type for the core model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, payment::PaymentInfo, user::User};

/// One inbound message with sender, chat, content and optional payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    /// "text", "successful_payment", or "other" for media and service messages.
    pub message_type: String,
    pub created_at: DateTime<Utc>,
    /// Set when `message_type` is "successful_payment".
    pub payment: Option<PaymentInfo>,
}

impl Message {
    /// True when the text starts with a bot command (`/name`).
    pub fn is_command(&self) -> bool {
        self.content.starts_with('/')
    }
}
