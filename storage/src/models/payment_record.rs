//! Telegram Stars payment log entry; maps to the `payments` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Refunded,
}

/// A successful payment as reported by Telegram.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: String,
    pub user_id: i64,
    pub payload: String,
    pub currency: String,
    pub total_amount: i64,
    /// Unique per payment; used to deduplicate redelivered updates and for refunds.
    pub telegram_payment_charge_id: String,
    pub provider_payment_charge_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// Creates a `Paid` record with a generated id and current timestamp.
    pub fn paid(
        user_id: i64,
        payload: String,
        currency: String,
        total_amount: i64,
        telegram_payment_charge_id: String,
        provider_payment_charge_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            payload,
            currency,
            total_amount,
            telegram_payment_charge_id,
            provider_payment_charge_id,
            status: PaymentStatus::Paid,
            created_at: Utc::now(),
            refunded_at: None,
        }
    }
}
