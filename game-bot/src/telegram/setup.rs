//! One-off Bot API calls made at startup: client construction, webhook and command registration.

use std::sync::Arc;

use anyhow::Context;
use teloxide::{
    payloads::SetWebhookSetters,
    prelude::*,
    types::{AllowedUpdate, BotCommand},
};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Builds a teloxide Bot, pointing it at a custom Bot API server when `api_url` is set.
pub fn build_teloxide_bot(token: &str, api_url: Option<&str>) -> anyhow::Result<teloxide::Bot> {
    let bot = teloxide::Bot::new(token);
    match api_url {
        Some(url) => {
            let url = reqwest::Url::parse(url)
                .with_context(|| format!("Invalid Telegram API URL: {}", url))?;
            info!(api_url = %url, "Using custom Telegram API URL");
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Registers the webhook so Telegram pushes messages and pre-checkout queries to `url`,
/// signed with `secret` in the X-Telegram-Bot-Api-Secret-Token header.
#[instrument(skip(bot, secret), fields(url = %url))]
pub async fn register_webhook(
    bot: &teloxide::Bot,
    url: reqwest::Url,
    secret: &str,
) -> anyhow::Result<()> {
    bot.set_webhook(url.clone())
        .secret_token(secret.to_string())
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::PreCheckoutQuery])
        .await
        .context("setWebhook failed")?;
    info!("Webhook registered");
    Ok(())
}

/// Publishes the command list shown in Telegram's command menu. Failure is logged, not fatal.
pub async fn register_commands(bot: &teloxide::Bot, commands: Vec<BotCommand>) {
    let count = commands.len();
    match bot.set_my_commands(commands).await {
        Ok(_) => info!(count, "Bot commands registered"),
        Err(e) => warn!(error = %e, "Failed to register bot commands"),
    }
}

/// Fetches the bot's username via getMe and stores it for command parsing
/// (`/cmd@botname` in groups).
pub async fn fetch_bot_username(
    bot: &teloxide::Bot,
    cache: &Arc<RwLock<Option<String>>>,
) -> anyhow::Result<String> {
    let me = bot.get_me().await.context("getMe failed")?;
    let username = me.username().to_string();
    *cache.write().await = Some(username.clone());
    info!(username = %username, "Bot identity loaded");
    Ok(username)
}
