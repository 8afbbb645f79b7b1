//! General commands: /start, /help, /stop, and the fallback for unknown commands.

use std::sync::Arc;

use async_trait::async_trait;
use storage::UserRepository;
use tracing::{info, instrument};

use super::commands::{help_text, UserCommand};
use super::{parse_command, reply, BotUsername, Parsed};
use crate::core::{Bot, Handler, HandlerResponse, Message, Result};

pub struct CommandHandler {
    users: UserRepository,
    bot: Arc<dyn Bot>,
    bot_username: BotUsername,
}

impl CommandHandler {
    pub fn new(users: UserRepository, bot: Arc<dyn Bot>, bot_username: BotUsername) -> Self {
        Self {
            users,
            bot,
            bot_username,
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let bot = self.bot.as_ref();
        match parse_command::<UserCommand>(message, &self.bot_username).await {
            Parsed::Command(UserCommand::Start) => {
                if message.chat.is_private() {
                    self.users.set_active(message.user.id, true).await?;
                    info!(user_id = message.user.id, "User subscribed");
                }
                let text = format!(
                    "Welcome! Your game progress is stored here and you will get announcements.\n\n{}",
                    help_text()
                );
                reply(bot, message, text).await
            }
            Parsed::Command(UserCommand::Help) | Parsed::Invalid => {
                reply(bot, message, help_text()).await
            }
            Parsed::Command(UserCommand::Stop) => {
                if message.chat.is_private() {
                    self.users.set_active(message.user.id, false).await?;
                    info!(user_id = message.user.id, "User unsubscribed");
                }
                reply(
                    bot,
                    message,
                    "You will no longer receive announcements. Send /start to subscribe again.",
                )
                .await
            }
            Parsed::NotMine if message.is_command() && message.chat.is_private() => {
                reply(bot, message, "Unknown command. Send /help to see what I can do.").await
            }
            Parsed::NotMine => Ok(HandlerResponse::Continue),
        }
    }
}
