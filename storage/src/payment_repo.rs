//! Payment repository: the Telegram Stars payment log.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::models::PaymentRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct PaymentRepository {
    pool_manager: SqlitePoolManager,
}

impl PaymentRepository {
    pub(crate) fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Records a payment. Telegram may redeliver the same update, so a second record with
    /// the same `telegram_payment_charge_id` is rejected with [`StorageError::AlreadyExists`].
    pub async fn record(&self, payment: &PaymentRecord) -> Result<(), StorageError> {
        if payment.total_amount <= 0 {
            return Err(StorageError::InvalidInput(format!(
                "payment amount must be positive, got {}",
                payment.total_amount
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO payments (id, user_id, payload, currency, total_amount, telegram_payment_charge_id, provider_payment_charge_id, status, created_at, refunded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(payment.user_id)
        .bind(&payment.payload)
        .bind(&payment.currency)
        .bind(payment.total_amount)
        .bind(&payment.telegram_payment_charge_id)
        .bind(&payment.provider_payment_charge_id)
        .bind(payment.status)
        .bind(payment.created_at)
        .bind(payment.refunded_at)
        .execute(self.pool_manager.pool())
        .await?;

        if result.rows_affected() == 0 {
            warn!(
                charge_id = %payment.telegram_payment_charge_id,
                user_id = payment.user_id,
                "Duplicate payment ignored"
            );
            return Err(StorageError::AlreadyExists(
                payment.telegram_payment_charge_id.clone(),
            ));
        }

        info!(
            user_id = payment.user_id,
            amount = payment.total_amount,
            currency = %payment.currency,
            charge_id = %payment.telegram_payment_charge_id,
            "Payment recorded"
        );
        Ok(())
    }

    pub async fn find_by_charge_id(
        &self,
        charge_id: &str,
    ) -> Result<Option<PaymentRecord>, StorageError> {
        let payment = sqlx::query_as::<_, PaymentRecord>(
            "SELECT * FROM payments WHERE telegram_payment_charge_id = ?",
        )
        .bind(charge_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(payment)
    }

    /// A user's payments, newest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<PaymentRecord>, StorageError> {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            "SELECT * FROM payments WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(payments)
    }

    /// Sum of a user's payments that have not been refunded.
    pub async fn total_paid_by_user(&self, user_id: i64) -> Result<i64, StorageError> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_amount), 0) FROM payments WHERE user_id = ? AND status = 'paid'",
        )
        .bind(user_id)
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(total.0)
    }

    /// Flips a paid payment to refunded. Returns false if unknown or already refunded.
    pub async fn mark_refunded(&self, charge_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET status = 'refunded', refunded_at = ?
            WHERE telegram_payment_charge_id = ? AND status = 'paid'
            "#,
        )
        .bind(Utc::now())
        .bind(charge_id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
