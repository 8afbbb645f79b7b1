//! Base config: Telegram Bot connection, logging, database. Loaded from env.

use anyhow::Result;

use super::env_opt;

/// Base config: Telegram-related, logging, database only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// Log file path
    pub log_file: String,
    /// SQLite database path or sqlx URL
    pub database_url: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env_opt("BOT_TOKEN").ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let database_url = Self::database_url_from_env();
        let log_file = env_opt("LOG_FILE").unwrap_or_else(|| "logs/game-bot.log".to_string());
        let telegram_api_url = env_opt("TELEGRAM_API_URL").or_else(|| env_opt("TELOXIDE_API_URL"));

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            database_url,
        })
    }

    /// DATABASE_URL or its default. Maintenance commands use this without needing BOT_TOKEN.
    pub fn database_url_from_env() -> String {
        env_opt("DATABASE_URL").unwrap_or_else(|| "./game_bot.db".to_string())
    }

    /// Validate config (e.g. telegram_api_url must be valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }
}
