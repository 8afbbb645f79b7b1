//! Webhook, admin and broadcast config sections.

use std::net::SocketAddr;

use anyhow::Result;
use base64::Engine;
use rand::RngCore;

use super::{env_opt, env_parse};

/// Telegram's limit for `secret_token` length.
const MAX_SECRET_LEN: usize = 256;

/// Telegram's documented bulk-send ceiling is about 30 messages per second.
const MAX_BROADCAST_RATE: u32 = 30;

/// 32 random bytes as base64url (no padding); only uses characters Telegram accepts
/// in `secret_token`.
pub fn generate_webhook_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Inbound webhook server and Telegram registration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// WEBHOOK_URL: public base URL Telegram calls (path is appended).
    pub public_url: Option<String>,
    /// WEBHOOK_LISTEN_ADDR
    pub listen_addr: SocketAddr,
    /// WEBHOOK_PATH
    pub path: String,
    /// WEBHOOK_SECRET, or a random one generated at startup.
    pub secret: String,
    /// UPDATE_QUEUE_CAPACITY
    pub queue_capacity: usize,
    /// MAX_CONCURRENT_UPDATES: messages accepted from the queue but not yet handled.
    pub max_in_flight: usize,
}

/// Paths the server mounts besides the webhook.
const RESERVED_PATHS: [&str; 2] = ["/health", "/admin"];

impl WebhookConfig {
    pub fn from_env() -> Result<Self> {
        let public_url = env_opt("WEBHOOK_URL");
        let listen_addr = env_parse("WEBHOOK_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let path = env_opt("WEBHOOK_PATH").unwrap_or_else(|| "/webhook".to_string());
        let secret = env_opt("WEBHOOK_SECRET").unwrap_or_else(generate_webhook_secret);
        let queue_capacity = env_parse("UPDATE_QUEUE_CAPACITY", 1024usize)?;
        let max_in_flight = env_parse("MAX_CONCURRENT_UPDATES", 32usize)?;
        Ok(Self {
            public_url,
            listen_addr,
            path,
            secret,
            queue_capacity,
            max_in_flight,
        })
    }

    /// Full URL registered with Telegram: base URL + path.
    pub fn endpoint(&self) -> Result<Option<reqwest::Url>> {
        match self.public_url {
            None => Ok(None),
            Some(ref base) => {
                let full = format!("{}{}", base.trim_end_matches('/'), self.path);
                let url = reqwest::Url::parse(&full)
                    .map_err(|e| anyhow::anyhow!("WEBHOOK_URL is not a valid URL ({}): {}", full, e))?;
                Ok(Some(url))
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_webhook_path(&self.path)?;
        if self.secret.is_empty() || self.secret.len() > MAX_SECRET_LEN {
            anyhow::bail!("WEBHOOK_SECRET must be 1-{} characters", MAX_SECRET_LEN);
        }
        if !self
            .secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("WEBHOOK_SECRET may only contain A-Z, a-z, 0-9, '_' and '-'");
        }
        if self.queue_capacity == 0 {
            anyhow::bail!("UPDATE_QUEUE_CAPACITY must be at least 1");
        }
        if self.max_in_flight == 0 {
            anyhow::bail!("MAX_CONCURRENT_UPDATES must be at least 1");
        }
        if let Some(url) = self.endpoint()? {
            if url.scheme() != "https" {
                anyhow::bail!("WEBHOOK_URL must use https (Telegram requirement): {}", url);
            }
        }
        Ok(())
    }
}

/// A literal route that cannot clash with the health or admin routes. Route syntax
/// characters are rejected since axum would read them as captures or wildcards.
pub(crate) fn validate_webhook_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        anyhow::bail!("WEBHOOK_PATH must start with '/': {:?}", path);
    }
    if let Some(c) = path
        .chars()
        .find(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
    {
        anyhow::bail!("WEBHOOK_PATH may not contain {:?}: {}", c, path);
    }
    if path.contains("//") {
        anyhow::bail!("WEBHOOK_PATH may not contain empty segments: {}", path);
    }
    let normalized = path.trim_end_matches('/');
    for reserved in RESERVED_PATHS {
        if normalized == reserved || normalized.starts_with(&format!("{}/", reserved)) {
            anyhow::bail!("WEBHOOK_PATH {} collides with the {} routes", path, reserved);
        }
    }
    Ok(())
}

/// Operator access: chat-command allowlist and optional HTTP admin API.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    /// ADMIN_IDS: comma-separated Telegram user ids.
    pub admin_ids: Vec<i64>,
    /// ADMIN_API_TOKEN: bearer token; the HTTP admin API is disabled when unset.
    pub api_token: Option<String>,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self> {
        let admin_ids = match env_opt("ADMIN_IDS") {
            None => Vec::new(),
            Some(raw) => parse_admin_ids(&raw)?,
        };
        let api_token = env_opt("ADMIN_API_TOKEN");
        Ok(Self {
            admin_ids,
            api_token,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// Parses `"1, 2,3"` into ids; empty entries are skipped.
pub(crate) fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| anyhow::anyhow!("ADMIN_IDS contains a non-numeric id: {:?}", s))
        })
        .collect()
}

/// Broadcast delivery pacing.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// BROADCAST_RATE_PER_SEC
    pub rate_per_sec: u32,
    /// BROADCAST_PAGE_SIZE: users loaded and committed per step.
    pub page_size: i64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            rate_per_sec: 25,
            page_size: 200,
        }
    }
}

impl BroadcastConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            rate_per_sec: env_parse("BROADCAST_RATE_PER_SEC", defaults.rate_per_sec)?,
            page_size: env_parse("BROADCAST_PAGE_SIZE", defaults.page_size)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_per_sec == 0 || self.rate_per_sec > MAX_BROADCAST_RATE {
            anyhow::bail!(
                "BROADCAST_RATE_PER_SEC must be 1-{}, got {}",
                MAX_BROADCAST_RATE,
                self.rate_per_sec
            );
        }
        if self.page_size <= 0 {
            anyhow::bail!("BROADCAST_PAGE_SIZE must be positive");
        }
        Ok(())
    }
}
