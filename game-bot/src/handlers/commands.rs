//! Command sets, parsed with teloxide's `BotCommands` derive. Each handler owns one set.

use teloxide::types::BotCommand;
use teloxide::utils::command::{BotCommands, ParseError};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "General:")]
pub enum UserCommand {
    #[command(description = "subscribe to announcements")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "stop receiving announcements")]
    Stop,
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Game saves:")]
pub enum GameCommand {
    #[command(description = "store data in a slot: /save <slot> <data>", parse_with = parse_save_args)]
    Save { slot: String, data: String },
    #[command(description = "show a slot: /load <slot>")]
    Load(String),
    #[command(description = "list your slots")]
    Slots,
    #[command(description = "delete a slot: /delete <slot>")]
    Delete(String),
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Support:")]
pub enum PaymentCommand {
    #[command(description = "donate Telegram Stars: /donate <amount>")]
    Donate(u32),
    #[command(description = "show how many Stars you donated")]
    Balance,
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Admin:")]
pub enum AdminCommand {
    #[command(description = "bot statistics")]
    Stats,
    #[command(description = "send a message to all subscribers: /broadcast <text>")]
    Broadcast(String),
    #[command(description = "recent broadcasts")]
    Broadcasts,
    #[command(description = "cancel a broadcast: /cancel <id>")]
    Cancel(i64),
    #[command(description = "refund a payment: /refund <user_id> <charge_id>", parse_with = "split")]
    Refund { user_id: i64, charge_id: String },
}

/// `<slot> <data...>`: the first word is the slot, the rest (spaces included) is the data.
fn parse_save_args(input: String) -> Result<(String, String), ParseError> {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((slot, data)) if !data.trim().is_empty() => {
            Ok((slot.to_string(), data.trim().to_string()))
        }
        _ => Err(ParseError::TooFewArguments {
            expected: 2,
            found: usize::from(!input.is_empty()),
            message: "usage: /save <slot> <data>".to_string(),
        }),
    }
}

/// Commands shown in Telegram's menu. Admin commands are left out.
pub fn menu_commands() -> Vec<BotCommand> {
    let mut commands = UserCommand::bot_commands();
    commands.extend(GameCommand::bot_commands());
    commands.extend(PaymentCommand::bot_commands());
    commands
}

/// Help text listing all user-facing command sets.
pub(crate) fn help_text() -> String {
    format!(
        "{}\n\n{}\n\n{}",
        UserCommand::descriptions(),
        GameCommand::descriptions(),
        PaymentCommand::descriptions()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_keeps_spaces_in_data() {
        let cmd = GameCommand::parse("/save main level=3 hp=10", "game_bot").unwrap();
        assert_eq!(
            cmd,
            GameCommand::Save {
                slot: "main".to_string(),
                data: "level=3 hp=10".to_string()
            }
        );
    }

    #[test]
    fn test_parse_save_requires_data() {
        assert!(GameCommand::parse("/save main", "game_bot").is_err());
        assert!(GameCommand::parse("/save", "game_bot").is_err());
    }

    #[test]
    fn test_parse_addressed_command() {
        let cmd = PaymentCommand::parse("/donate@game_bot 50", "game_bot").unwrap();
        assert_eq!(cmd, PaymentCommand::Donate(50));
        assert!(matches!(
            PaymentCommand::parse("/donate@other_bot 50", "game_bot"),
            Err(ParseError::WrongBotName(_))
        ));
    }

    #[test]
    fn test_parse_refund_args() {
        let cmd = AdminCommand::parse("/refund 42 tg_charge_1", "game_bot").unwrap();
        assert_eq!(
            cmd,
            AdminCommand::Refund {
                user_id: 42,
                charge_id: "tg_charge_1".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command_for_set() {
        assert!(matches!(
            AdminCommand::parse("/save main x", "game_bot"),
            Err(ParseError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_menu_commands_exclude_admin() {
        let names: Vec<String> = menu_commands().into_iter().map(|c| c.command).collect();
        assert!(names.iter().any(|n| n.contains("save")));
        assert!(names.iter().any(|n| n.contains("donate")));
        assert!(!names.iter().any(|n| n.contains("broadcast")));
    }
}
