//! Error types for the bot core.
//!
//! [`DbotError`] is the top-level error; [`HandlerError`] is used for handler failures.

use std::time::Duration;

use storage::StorageError;
use thiserror::Error;

/// Top-level error for handler and transport operations.
#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Bot error: {0}")]
    Bot(String),

    /// The recipient blocked the bot or deleted their account; sending to them will keep failing.
    #[error("Bot was blocked by the user")]
    BotBlocked,

    /// Telegram flood control; retry after the given delay.
    #[error("Rate limited, retry after {0:?}")]
    RetryAfter(Duration),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

impl From<StorageError> for DbotError {
    fn from(e: StorageError) -> Self {
        DbotError::Database(e.to_string())
    }
}

/// Errors produced by handlers.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unauthorized access")]
    Unauthorized,
}

/// Result type for core operations; uses [`DbotError`].
pub type Result<T> = std::result::Result<T, DbotError>;
