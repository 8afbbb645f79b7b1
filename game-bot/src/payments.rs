//! Telegram Stars donations: invoice construction and pre-checkout validation.
//!
//! Invoices carry a payload `donate:<user_id>:<amount>` so the pre-checkout answer and the
//! later successful-payment message can be checked against what was actually offered.

use crate::core::{DbotError, HandlerError, Invoice, PreCheckout, Result};

/// Telegram Stars currency code. Stars invoices need no provider token.
pub const STARS_CURRENCY: &str = "XTR";

pub const MIN_DONATION: u32 = 1;
pub const MAX_DONATION: u32 = 10_000;

const DONATION_PREFIX: &str = "donate";

/// Parsed donation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationPayload {
    pub user_id: i64,
    pub amount: u32,
}

impl DonationPayload {
    pub fn encode(&self) -> String {
        format!("{}:{}:{}", DONATION_PREFIX, self.user_id, self.amount)
    }

    /// Parses `donate:<user_id>:<amount>`. Returns None for any other shape.
    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.split(':');
        if parts.next()? != DONATION_PREFIX {
            return None;
        }
        let user_id = parts.next()?.parse().ok()?;
        let amount = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { user_id, amount })
    }
}

fn amount_in_range(amount: u32) -> bool {
    (MIN_DONATION..=MAX_DONATION).contains(&amount)
}

/// Builds the Stars invoice for a donation of `amount` from `user_id`.
pub fn build_donation_invoice(user_id: i64, amount: u32) -> Result<Invoice> {
    if !amount_in_range(amount) {
        return Err(DbotError::Handler(HandlerError::InvalidCommand(format!(
            "donation must be between {} and {} Stars",
            MIN_DONATION, MAX_DONATION
        ))));
    }
    Ok(Invoice {
        title: "Support the game".to_string(),
        description: format!("Donate {} Stars to support development.", amount),
        payload: DonationPayload { user_id, amount }.encode(),
        currency: STARS_CURRENCY.to_string(),
        amount,
    })
}

/// Checks a pre-checkout query against the invoice it claims to pay for. The error string is
/// shown to the user by Telegram.
pub fn validate_pre_checkout(query: &PreCheckout) -> std::result::Result<(), String> {
    if query.currency != STARS_CURRENCY {
        return Err(format!("Unsupported currency {}", query.currency));
    }
    let payload = DonationPayload::parse(&query.invoice_payload)
        .ok_or_else(|| "Unknown invoice".to_string())?;
    if payload.user_id != query.user.id {
        return Err("This invoice was issued to another user".to_string());
    }
    if i64::from(payload.amount) != query.total_amount {
        return Err("Invoice amount mismatch".to_string());
    }
    if !amount_in_range(payload.amount) {
        return Err("Donation amount out of range".to_string());
    }
    Ok(())
}
