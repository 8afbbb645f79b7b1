//! # Webhook
//!
//! Telegram pushes updates to an HTTP endpoint; [`router`] accepts them, checks the secret
//! token and enqueues them on a bounded channel. [`UpdateDispatcher`] drains the channel and
//! runs the handler chain, so HTTP handlers never wait on Telegram or the database.

mod dispatcher;
mod server;

use teloxide::types::Update;
use tokio::sync::mpsc;

pub use dispatcher::{UpdateDispatcher, DEFAULT_MAX_IN_FLIGHT};
pub use server::{router, WebhookState, SECRET_HEADER};

/// Bounded queue between the HTTP endpoint and the dispatcher.
pub fn update_queue(capacity: usize) -> (mpsc::Sender<Update>, mpsc::Receiver<Update>) {
    mpsc::channel(capacity)
}
