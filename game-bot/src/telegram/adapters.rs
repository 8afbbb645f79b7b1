//! Converters from teloxide types to core types.

use crate::core::{Chat, Message, PaymentInfo, PreCheckout, ToCoreMessage, ToCoreUser, User};

/// Telegram user → core user.
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Telegram message → core message. Successful-payment service messages carry [`PaymentInfo`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let msg = self.0;
        let payment = self.payment_info();
        let (message_type, content) = match (&payment, msg.text()) {
            (Some(p), _) => (
                "successful_payment",
                format!("{} {}", p.total_amount, p.currency),
            ),
            (None, Some(text)) => ("text", text.to_string()),
            (None, None) => ("other", msg.caption().unwrap_or("").to_string()),
        };

        Message {
            id: msg.id.to_string(),
            user: msg
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content,
            message_type: message_type.to_string(),
            created_at: chrono::Utc::now(),
            payment,
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_group() {
            "group"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_channel() {
            "channel"
        } else {
            "unknown"
        }
    }

    fn payment_info(&self) -> Option<PaymentInfo> {
        self.0.successful_payment().map(|p| PaymentInfo {
            currency: p.currency.clone(),
            total_amount: p.total_amount as i64,
            invoice_payload: p.invoice_payload.clone(),
            telegram_payment_charge_id: p.telegram_payment_charge_id.0.clone(),
            provider_payment_charge_id: p.provider_payment_charge_id.clone(),
        })
    }
}

/// Telegram pre-checkout query → core [`PreCheckout`]. The query id is not carried over;
/// the dispatcher answers with the teloxide value.
pub struct TelegramPreCheckoutWrapper<'a>(pub &'a teloxide::types::PreCheckoutQuery);

impl<'a> TelegramPreCheckoutWrapper<'a> {
    pub fn to_core(&self) -> PreCheckout {
        PreCheckout {
            user: TelegramUserWrapper(&self.0.from).to_core(),
            currency: self.0.currency.clone(),
            total_amount: self.0.total_amount as i64,
            invoice_payload: self.0.invoice_payload.clone(),
        }
    }
}
