//! Telegram layer: adapters to core types, the core Bot implementation, and API setup calls.

mod adapters;
mod bot_adapter;
mod setup;

pub use adapters::{TelegramMessageWrapper, TelegramPreCheckoutWrapper, TelegramUserWrapper};
pub use bot_adapter::{map_request_error, TelegramBotAdapter};
pub use setup::{build_teloxide_bot, fetch_bot_username, register_commands, register_webhook};
