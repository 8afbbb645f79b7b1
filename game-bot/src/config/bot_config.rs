//! BotConfig: BaseConfig + webhook, admin and broadcast sections. Use load() for env-based loading.

use anyhow::Result;

use super::{AdminConfig, BaseConfig, BroadcastConfig, WebhookConfig};

/// Bot config. Use BotConfig::load() for env-based loading, then validate().
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub webhook: WebhookConfig,
    pub admin: AdminConfig,
    pub broadcast: BroadcastConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        Ok(Self {
            base: BaseConfig::load(token)?,
            webhook: WebhookConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            broadcast: BroadcastConfig::from_env()?,
        })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.webhook.validate()?;
        self.broadcast.validate()
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
}
