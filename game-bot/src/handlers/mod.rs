//! # Handlers
//!
//! Chain order: [`UserRegistryHandler`] → [`PersistenceHandler`] → [`AdminHandler`] →
//! [`PaymentHandler`] → [`GameHandler`] → [`CommandHandler`].
//!
//! A handler that answers sends the text itself and returns `Reply(text)`, so the
//! persistence handler's `after` logs exactly what the user received.

mod admin_handler;
mod command_handler;
mod commands;
mod game_handler;
mod payment_handler;
mod persistence_handler;
mod user_registry;

use std::sync::Arc;

use teloxide::utils::command::{BotCommands, ParseError};
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::{Bot, HandlerResponse, Message, Result};

pub use admin_handler::AdminHandler;
pub use command_handler::CommandHandler;
pub use commands::{menu_commands, AdminCommand, GameCommand, PaymentCommand, UserCommand};
pub use game_handler::GameHandler;
pub use payment_handler::PaymentHandler;
pub use persistence_handler::PersistenceHandler;
pub use user_registry::UserRegistryHandler;

/// Bot username (without '@'), filled from getMe at startup. Commands addressed as
/// `/cmd@name` only match this bot.
pub type BotUsername = Arc<RwLock<Option<String>>>;

/// Outcome of parsing a message against one command set.
pub(crate) enum Parsed<C> {
    Command(C),
    /// Not a command of this set, or addressed to another bot.
    NotMine,
    /// A command of this set with missing or malformed arguments.
    Invalid,
}

pub(crate) async fn parse_command<C: BotCommands>(
    message: &Message,
    bot_username: &BotUsername,
) -> Parsed<C> {
    if !message.is_command() {
        return Parsed::NotMine;
    }
    let username = bot_username.read().await.clone().unwrap_or_default();
    match C::parse(&message.content, &username) {
        Ok(cmd) => Parsed::Command(cmd),
        Err(ParseError::UnknownCommand(_)) | Err(ParseError::WrongBotName(_)) => Parsed::NotMine,
        Err(e) => {
            debug!(error = %e, content = %message.content, "Command arguments rejected");
            Parsed::Invalid
        }
    }
}

/// Sends `text` as a reply and returns `Reply(text)`.
pub(crate) async fn reply(
    bot: &dyn Bot,
    message: &Message,
    text: impl Into<String>,
) -> Result<HandlerResponse> {
    let text = text.into();
    bot.reply_to(message, &text).await?;
    Ok(HandlerResponse::Reply(text))
}
