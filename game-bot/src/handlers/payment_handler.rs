//! Stars donations: `/donate`, `/balance`, and recording successful payments.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{PaymentRecord, PaymentRepository, StorageError};
use tracing::{info, instrument, warn};

use super::commands::PaymentCommand;
use super::{parse_command, reply, BotUsername, Parsed};
use crate::core::{Bot, Handler, HandlerResponse, Message, PaymentInfo, Result};
use crate::payments::{build_donation_invoice, DonationPayload, MAX_DONATION, MIN_DONATION};

pub struct PaymentHandler {
    payments: PaymentRepository,
    bot: Arc<dyn Bot>,
    bot_username: BotUsername,
}

impl PaymentHandler {
    pub fn new(payments: PaymentRepository, bot: Arc<dyn Bot>, bot_username: BotUsername) -> Self {
        Self {
            payments,
            bot,
            bot_username,
        }
    }

    fn usage() -> String {
        format!("Usage: /donate <amount>, from {} to {} Stars.", MIN_DONATION, MAX_DONATION)
    }

    /// Records a completed payment. Telegram may deliver the same service message twice;
    /// the second delivery is acknowledged silently.
    #[instrument(skip(self, message, payment), fields(charge_id = %payment.telegram_payment_charge_id))]
    async fn record_payment(
        &self,
        message: &Message,
        payment: &PaymentInfo,
    ) -> Result<HandlerResponse> {
        if DonationPayload::parse(&payment.invoice_payload).is_none() {
            warn!(payload = %payment.invoice_payload, "Payment with unknown payload; recording anyway");
        }

        let record = PaymentRecord::paid(
            message.user.id,
            payment.invoice_payload.clone(),
            payment.currency.clone(),
            payment.total_amount,
            payment.telegram_payment_charge_id.clone(),
            payment.provider_payment_charge_id.clone(),
        );

        match self.payments.record(&record).await {
            Ok(()) => {
                info!(
                    user_id = message.user.id,
                    amount = payment.total_amount,
                    currency = %payment.currency,
                    "step: payment recorded"
                );
                reply(
                    self.bot.as_ref(),
                    message,
                    format!("Thank you for your support of {} Stars!", payment.total_amount),
                )
                .await
            }
            Err(StorageError::AlreadyExists(_)) => {
                info!(user_id = message.user.id, "Duplicate payment delivery ignored");
                Ok(HandlerResponse::Stop)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Handler for PaymentHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if let Some(payment) = &message.payment {
            return self.record_payment(message, payment).await;
        }

        match parse_command::<PaymentCommand>(message, &self.bot_username).await {
            Parsed::Command(PaymentCommand::Donate(amount)) => {
                match build_donation_invoice(message.user.id, amount) {
                    Ok(invoice) => {
                        self.bot.send_invoice(&message.chat, &invoice).await?;
                        info!(user_id = message.user.id, amount, "step: donation invoice sent");
                        Ok(HandlerResponse::Stop)
                    }
                    Err(_) => reply(self.bot.as_ref(), message, Self::usage()).await,
                }
            }
            Parsed::Command(PaymentCommand::Balance) => {
                let total = self.payments.total_paid_by_user(message.user.id).await?;
                let text = if total > 0 {
                    format!("You have donated {} Stars. Thank you!", total)
                } else {
                    "You have not donated yet. Try /donate 50.".to_string()
                };
                reply(self.bot.as_ref(), message, text).await
            }
            Parsed::Invalid => reply(self.bot.as_ref(), message, Self::usage()).await,
            Parsed::NotMine => Ok(HandlerResponse::Continue),
        }
    }
}
