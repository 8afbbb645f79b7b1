//! Bot configuration: BaseConfig (Telegram + log + DB) plus the webhook, admin and
//! broadcast sections. Everything is loaded from environment variables.

mod base;
mod bot_config;
mod sections;

#[cfg(test)]
mod tests;

pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use sections::{generate_webhook_secret, AdminConfig, BroadcastConfig, WebhookConfig};

use anyhow::Result;
use std::env;
use std::str::FromStr;

/// Reads an optional env var and parses it; unset or empty yields `default`.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", name, raw, e)),
        _ => Ok(default),
    }
}

/// Reads an optional, non-empty env var.
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}
