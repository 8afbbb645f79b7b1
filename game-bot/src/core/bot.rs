//! Bot abstraction for outbound calls.
//!
//! [`Bot`] is transport-agnostic; `telegram::TelegramBotAdapter` implements it via teloxide
//! and tests substitute a recording mock.

use async_trait::async_trait;

use super::error::Result;
use super::types::{Chat, Invoice, Message};

/// Outbound operations the handlers and the broadcast worker need.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Sends a Stars invoice to the chat.
    async fn send_invoice(&self, chat: &Chat, invoice: &Invoice) -> Result<()>;
    /// Returns a Stars payment to the user.
    async fn refund_star_payment(&self, user_id: i64, telegram_payment_charge_id: &str)
        -> Result<()>;
}
