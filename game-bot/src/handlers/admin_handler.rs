//! Admin chat commands, restricted to the configured user id allowlist.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{BotStats, Database, PaymentStatus};
use tracing::{info, instrument, warn};

use super::commands::AdminCommand;
use super::{parse_command, reply, BotUsername, Parsed};
use crate::broadcast::BroadcastHandle;
use crate::core::{Bot, DbotError, Handler, HandlerResponse, Message, Result};

const NOT_AUTHORIZED: &str = "Not authorized.";
const USAGE: &str = "Admin commands: /stats, /broadcast <text>, /broadcasts, /cancel <id>, \
/refund <user_id> <charge_id>";
const RECENT_BROADCASTS: i64 = 10;

pub struct AdminHandler {
    admin_ids: Vec<i64>,
    db: Database,
    broadcasts: BroadcastHandle,
    bot: Arc<dyn Bot>,
    bot_username: BotUsername,
}

pub(crate) fn format_stats(stats: &BotStats) -> String {
    format!(
        "Users: {} ({} active, {} blocked)\n\
         Messages: {} ({} received, {} sent)\n\
         Game saves: {}\n\
         Payments: {} ({} Stars)\n\
         Broadcasts: {}",
        stats.total_users,
        stats.active_users,
        stats.blocked_users,
        stats.total_messages,
        stats.received_messages,
        stats.sent_messages,
        stats.game_saves,
        stats.payments,
        stats.stars_received,
        stats.broadcasts
    )
}

impl AdminHandler {
    pub fn new(
        admin_ids: Vec<i64>,
        db: Database,
        broadcasts: BroadcastHandle,
        bot: Arc<dyn Bot>,
        bot_username: BotUsername,
    ) -> Self {
        Self {
            admin_ids,
            db,
            broadcasts,
            bot,
            bot_username,
        }
    }

    fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    async fn execute(&self, admin_id: i64, cmd: AdminCommand) -> Result<String> {
        let text = match cmd {
            AdminCommand::Stats => format_stats(&self.db.stats().await?),
            AdminCommand::Broadcast(text) => {
                if text.trim().is_empty() {
                    return Ok("Usage: /broadcast <text>".to_string());
                }
                let job = self.broadcasts.submit(&text, admin_id).await?;
                format!(
                    "Broadcast #{} queued for {} users.",
                    job.id, job.total_targets
                )
            }
            AdminCommand::Broadcasts => {
                let jobs = self.broadcasts.recent(RECENT_BROADCASTS).await?;
                if jobs.is_empty() {
                    "No broadcasts yet.".to_string()
                } else {
                    jobs.iter()
                        .map(|j| {
                            format!(
                                "#{} {}: sent {}/{}, failed {}",
                                j.id, j.status, j.sent, j.total_targets, j.failed
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            AdminCommand::Cancel(id) => {
                if self.broadcasts.cancel(id).await? {
                    format!("Broadcast #{} cancelled.", id)
                } else {
                    format!("Broadcast #{} is not pending or running.", id)
                }
            }
            AdminCommand::Refund { user_id, charge_id } => {
                self.refund(user_id, &charge_id).await?
            }
        };
        Ok(text)
    }

    async fn refund(&self, user_id: i64, charge_id: &str) -> Result<String> {
        let payments = self.db.payments();
        let Some(payment) = payments.find_by_charge_id(charge_id).await? else {
            return Ok("Payment not found.".to_string());
        };
        if payment.user_id != user_id {
            return Ok("That payment belongs to another user.".to_string());
        }
        if payment.status == PaymentStatus::Refunded {
            return Ok("Payment was already refunded.".to_string());
        }

        if let Err(e) = self.bot.refund_star_payment(user_id, charge_id).await {
            let reason = refund_failure_reason(&e);
            warn!(user_id, charge_id, reason = %reason, "Refund not completed");
            return Ok(format!("Refund failed: {}", reason));
        }
        payments.mark_refunded(charge_id).await?;
        info!(user_id, charge_id, amount = payment.total_amount, "step: payment refunded");
        Ok(format!(
            "Refunded {} Stars to user {}.",
            payment.total_amount, user_id
        ))
    }
}

/// Admin-facing text for a failed `refundStarPayment`; the payment stays `paid`.
fn refund_failure_reason(error: &DbotError) -> String {
    match error {
        DbotError::Bot(reason) => reason.clone(),
        DbotError::BotBlocked => "the user has blocked the bot or deleted their account".to_string(),
        DbotError::RetryAfter(delay) => {
            format!("Telegram rate limit, try again in {}s", delay.as_secs().max(1))
        }
        other => other.to_string(),
    }
}

#[async_trait]
impl Handler for AdminHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let parsed = parse_command::<AdminCommand>(message, &self.bot_username).await;
        if matches!(parsed, Parsed::NotMine) {
            return Ok(HandlerResponse::Continue);
        }
        if !self.is_admin(message.user.id) {
            warn!(user_id = message.user.id, content = %message.content, "Admin command from non-admin");
            return reply(self.bot.as_ref(), message, NOT_AUTHORIZED).await;
        }

        let text = match parsed {
            Parsed::Command(cmd) => self.execute(message.user.id, cmd).await?,
            _ => USAGE.to_string(),
        };
        reply(self.bot.as_ref(), message, text).await
    }
}
