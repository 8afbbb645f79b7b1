//! Binary for the game bot: webhook server plus maintenance commands.

use anyhow::Result;
use clap::Parser;
use game_bot::{cleanup_messages, print_stats, run_bot, BotConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            token,
            skip_set_webhook,
        } => {
            let config = BotConfig::load(token)?;
            run_bot(config, skip_set_webhook).await
        }
        Commands::Stats => print_stats().await,
        Commands::Cleanup { days } => cleanup_messages(days).await.map(|_| ()),
    }
}
