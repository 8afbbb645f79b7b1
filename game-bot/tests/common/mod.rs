//! Shared fixtures for game-bot integration tests: a recording [`MockBot`], message builders,
//! and an in-memory database.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use game_bot::{
    Bot, Chat, DbotError, Invoice, Message, PaymentInfo, Result, User,
};
use storage::Database;
use tokio::sync::Notify;

/// One recorded `send_message` / `reply_to` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub chat_id: i64,
    pub text: String,
}

/// Hold point inside `send_message`: `reached` fires when the send to the paused user starts,
/// and the send completes only after `release` is notified.
#[derive(Clone)]
pub struct Pause {
    pub reached: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Mock Bot that records outbound calls. Users in `blocked` fail with `BotBlocked`;
/// users in `rate_limited` fail once with `RetryAfter` and succeed afterwards.
#[derive(Default)]
pub struct MockBot {
    pub sent: Mutex<Vec<SentRecord>>,
    pub sent_at: Mutex<Vec<Instant>>,
    pub invoices: Mutex<Vec<(i64, Invoice)>>,
    pub refunds: Mutex<Vec<(i64, String)>>,
    pub attempts: AtomicUsize,
    blocked: HashSet<i64>,
    rate_limited: Mutex<HashSet<i64>>,
    always_retry_after: Option<Duration>,
    pause: Option<(i64, Pause)>,
    paused_once: AtomicBool,
    refund_error: Option<DbotError>,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked(mut self, user_ids: &[i64]) -> Self {
        self.blocked.extend(user_ids.iter().copied());
        self
    }

    pub fn with_rate_limited_once(self, user_ids: &[i64]) -> Self {
        self.rate_limited
            .lock()
            .unwrap()
            .extend(user_ids.iter().copied());
        self
    }

    /// Every send fails with `RetryAfter(delay)`.
    pub fn with_rate_limited_always(mut self, delay: Duration) -> Self {
        self.always_retry_after = Some(delay);
        self
    }

    /// The first send to `user_id` waits on the returned [`Pause`].
    pub fn with_pause_before(mut self, user_id: i64) -> (Self, Pause) {
        let pause = Pause {
            reached: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        self.pause = Some((user_id, pause.clone()));
        (self, pause)
    }

    pub fn with_refund_error(self, reason: &str) -> Self {
        self.with_refund_failure(DbotError::Bot(reason.to_string()))
    }

    pub fn with_refund_failure(mut self, error: DbotError) -> Self {
        self.refund_error = Some(error);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.text).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent().last().map(|r| r.text.clone())
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|r| r.chat_id == chat_id)
            .map(|r| r.text)
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some((user_id, pause)) = &self.pause {
            if *user_id == chat.id && !self.paused_once.swap(true, Ordering::SeqCst) {
                pause.reached.notify_one();
                pause.release.notified().await;
            }
        }
        if let Some(delay) = self.always_retry_after {
            return Err(DbotError::RetryAfter(delay));
        }
        if self.blocked.contains(&chat.id) {
            return Err(DbotError::BotBlocked);
        }
        if self.rate_limited.lock().unwrap().remove(&chat.id) {
            return Err(DbotError::RetryAfter(Duration::from_millis(20)));
        }
        self.sent.lock().unwrap().push(SentRecord {
            chat_id: chat.id,
            text: text.to_string(),
        });
        self.sent_at.lock().unwrap().push(Instant::now());
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_invoice(&self, chat: &Chat, invoice: &Invoice) -> Result<()> {
        self.invoices.lock().unwrap().push((chat.id, invoice.clone()));
        Ok(())
    }

    async fn refund_star_payment(
        &self,
        user_id: i64,
        telegram_payment_charge_id: &str,
    ) -> Result<()> {
        if let Some(error) = &self.refund_error {
            return Err(match error {
                DbotError::Bot(reason) => DbotError::Bot(reason.clone()),
                DbotError::BotBlocked => DbotError::BotBlocked,
                DbotError::RetryAfter(delay) => DbotError::RetryAfter(*delay),
                other => DbotError::Bot(other.to_string()),
            });
        }
        self.refunds
            .lock()
            .unwrap()
            .push((user_id, telegram_payment_charge_id.to_string()));
        Ok(())
    }
}

pub async fn memory_db() -> Database {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database")
}

/// Text message from `user_id` in their private chat.
pub fn private_text(user_id: i64, content: &str) -> Message {
    Message {
        id: format!("msg_{}", user_id),
        content: content.to_string(),
        user: User {
            id: user_id,
            username: Some(format!("player{}", user_id)),
            first_name: Some("Player".to_string()),
            last_name: None,
        },
        chat: Chat::private(user_id),
        message_type: "text".to_string(),
        created_at: Utc::now(),
        payment: None,
    }
}

/// Text message from `user_id` in a group chat.
pub fn group_text(user_id: i64, chat_id: i64, content: &str) -> Message {
    let mut message = private_text(user_id, content);
    message.chat = Chat {
        id: chat_id,
        chat_type: "group".to_string(),
    };
    message
}

/// Successful-payment service message for a Stars donation.
pub fn successful_payment(user_id: i64, amount: i64, charge_id: &str) -> Message {
    let mut message = private_text(user_id, &format!("{} XTR", amount));
    message.message_type = "successful_payment".to_string();
    message.payment = Some(PaymentInfo {
        currency: "XTR".to_string(),
        total_amount: amount,
        invoice_payload: format!("donate:{}:{}", user_id, amount),
        telegram_payment_charge_id: charge_id.to_string(),
        provider_payment_charge_id: String::new(),
    });
    message
}
