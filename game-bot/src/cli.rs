//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "game-bot")]
#[command(about = "Game Storage + Stars + Broadcast + Admin Panel bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// Do not call setWebhook at startup.
        #[arg(long)]
        skip_set_webhook: bool,
    },
    /// Print bot statistics as JSON.
    Stats,
    /// Delete logged messages older than the given number of days.
    Cleanup {
        #[arg(short, long, default_value = "90")]
        days: u32,
    },
}
