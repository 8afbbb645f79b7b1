//! Wraps teloxide::Bot and implements [`crate::core::Bot`]. Production code talks to Telegram;
//! tests can substitute another Bot impl.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, LabeledPrice, TelegramTransactionId, UserId},
    ApiError, RequestError,
};

use crate::core::{Bot as CoreBot, Chat, DbotError, Invoice, Message, Result};

/// Maps a teloxide request failure to [`DbotError`]. Recipients that can no longer be reached
/// become [`DbotError::BotBlocked`]; flood control becomes [`DbotError::RetryAfter`].
pub fn map_request_error(e: RequestError) -> DbotError {
    match e {
        RequestError::Api(ApiError::BotBlocked)
        | RequestError::Api(ApiError::UserDeactivated)
        | RequestError::Api(ApiError::CantInitiateConversation) => DbotError::BotBlocked,
        RequestError::RetryAfter(secs) => DbotError::RetryAfter(secs.duration()),
        other => DbotError::Bot(other.to_string()),
    }
}

/// Thin wrapper around teloxide::Bot that implements the core Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_invoice(&self, chat: &Chat, invoice: &Invoice) -> Result<()> {
        let prices = vec![LabeledPrice::new(invoice.title.clone(), invoice.amount)];
        self.bot
            .send_invoice(
                ChatId(chat.id),
                invoice.title.clone(),
                invoice.description.clone(),
                invoice.payload.clone(),
                invoice.currency.clone(),
                prices,
            )
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn refund_star_payment(
        &self,
        user_id: i64,
        telegram_payment_charge_id: &str,
    ) -> Result<()> {
        let user_id = u64::try_from(user_id)
            .map_err(|_| DbotError::Bot(format!("Invalid user id for refund: {}", user_id)))?;
        self.bot
            .refund_star_payment(
                UserId(user_id),
                TelegramTransactionId(telegram_payment_charge_id.to_string()),
            )
            .await
            .map_err(map_request_error)?;
        Ok(())
    }
}
