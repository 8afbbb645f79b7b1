//! Game save commands. Data is stored as given; the bot knows nothing about game rules.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{validate_slot, GameRepository, StorageError};
use tracing::{info, instrument};

use super::commands::GameCommand;
use super::{parse_command, reply, BotUsername, Parsed};
use crate::core::{Bot, Handler, HandlerResponse, Message, Result};

const USAGE: &str = "Usage: /save <slot> <data>, /load <slot>, /slots, /delete <slot>\n\
Slot names: up to 32 letters, digits, '_' or '-'.";

pub struct GameHandler {
    games: GameRepository,
    bot: Arc<dyn Bot>,
    bot_username: BotUsername,
}

impl GameHandler {
    pub fn new(games: GameRepository, bot: Arc<dyn Bot>, bot_username: BotUsername) -> Self {
        Self {
            games,
            bot,
            bot_username,
        }
    }

    async fn execute(&self, user_id: i64, cmd: GameCommand) -> Result<String> {
        let text = match cmd {
            GameCommand::Save { slot, data } => match self.games.save(user_id, &slot, &data).await {
                Ok(save) => {
                    info!(user_id, slot = %slot, version = save.version, "Game saved");
                    format!("Saved slot '{}' (version {}).", save.slot, save.version)
                }
                Err(StorageError::InvalidInput(reason)) => format!("Cannot save: {}.", reason),
                Err(e) => return Err(e.into()),
            },
            GameCommand::Load(slot) => {
                let slot = slot.trim();
                if validate_slot(slot).is_err() {
                    return Ok(USAGE.to_string());
                }
                match self.games.load(user_id, slot).await? {
                    Some(save) => format!("Slot '{}' (version {}):\n{}", save.slot, save.version, save.data),
                    None => format!("No save in slot '{}'.", slot),
                }
            }
            GameCommand::Slots => {
                let saves = self.games.list_slots(user_id).await?;
                if saves.is_empty() {
                    "You have no saves yet. Use /save <slot> <data>.".to_string()
                } else {
                    let lines: Vec<String> = saves
                        .iter()
                        .map(|s| {
                            format!(
                                "- {} (version {}, updated {})",
                                s.slot,
                                s.version,
                                s.updated_at.format("%Y-%m-%d %H:%M UTC")
                            )
                        })
                        .collect();
                    format!("Your slots:\n{}", lines.join("\n"))
                }
            }
            GameCommand::Delete(slot) => {
                let slot = slot.trim();
                if validate_slot(slot).is_err() {
                    return Ok(USAGE.to_string());
                }
                if self.games.delete(user_id, slot).await? {
                    format!("Deleted slot '{}'.", slot)
                } else {
                    format!("No save in slot '{}'.", slot)
                }
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl Handler for GameHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.user.id == 0 {
            return Ok(HandlerResponse::Continue);
        }
        match parse_command::<GameCommand>(message, &self.bot_username).await {
            Parsed::Command(cmd) => {
                let text = self.execute(message.user.id, cmd).await?;
                reply(self.bot.as_ref(), message, text).await
            }
            Parsed::Invalid => reply(self.bot.as_ref(), message, USAGE).await,
            Parsed::NotMine => Ok(HandlerResponse::Continue),
        }
    }
}
