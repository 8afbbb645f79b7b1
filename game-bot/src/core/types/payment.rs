//! Payment-related types: outgoing invoices, pre-checkout queries and completed payments.

use serde::{Deserialize, Serialize};

use super::user::User;

/// Invoice to send to a chat. Stars invoices use currency `XTR` and a single price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    pub payload: String,
    pub currency: String,
    pub amount: u32,
}

/// Checkout confirmation Telegram asks for before charging the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCheckout {
    pub user: User,
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
}

/// Completed payment carried by a successful-payment service message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
    pub telegram_payment_charge_id: String,
    pub provider_payment_charge_id: String,
}
