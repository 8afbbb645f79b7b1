//! Config tests.

use crate::config::sections::{parse_admin_ids, validate_webhook_path};
use crate::config::{BotConfig, BroadcastConfig};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "BOT_TOKEN",
    "DATABASE_URL",
    "LOG_FILE",
    "TELEGRAM_API_URL",
    "TELOXIDE_API_URL",
    "WEBHOOK_URL",
    "WEBHOOK_LISTEN_ADDR",
    "WEBHOOK_PATH",
    "WEBHOOK_SECRET",
    "UPDATE_QUEUE_CAPACITY",
    "MAX_CONCURRENT_UPDATES",
    "ADMIN_IDS",
    "ADMIN_API_TOKEN",
    "BROADCAST_RATE_PER_SEC",
    "BROADCAST_PAGE_SIZE",
];

fn clear_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    clear_env();
    env::set_var("BOT_TOKEN", "test_token");

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.bot_token(), "test_token");
    assert!(config.telegram_api_url().is_none());
    assert_eq!(config.database_url(), "./game_bot.db");
    assert_eq!(config.log_file(), "logs/game-bot.log");
    assert_eq!(config.webhook.path, "/webhook");
    assert_eq!(config.webhook.listen_addr.port(), 8080);
    assert_eq!(config.webhook.queue_capacity, 1024);
    assert_eq!(config.webhook.max_in_flight, 32);
    assert!(config.webhook.public_url.is_none());
    assert!(!config.webhook.secret.is_empty());
    assert!(config.admin.admin_ids.is_empty());
    assert!(config.admin.api_token.is_none());
    assert_eq!(config.broadcast.rate_per_sec, 25);
    assert_eq!(config.broadcast.page_size, 200);
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
#[serial]
fn test_load_config_with_custom_values() {
    clear_env();
    env::set_var("BOT_TOKEN", "custom_token");
    env::set_var("DATABASE_URL", "custom.db");
    env::set_var("WEBHOOK_URL", "https://bot.example.com/");
    env::set_var("WEBHOOK_PATH", "/tg/updates");
    env::set_var("WEBHOOK_LISTEN_ADDR", "127.0.0.1:9000");
    env::set_var("WEBHOOK_SECRET", "s3cret_value-1");
    env::set_var("ADMIN_IDS", "42, 7");
    env::set_var("ADMIN_API_TOKEN", "admintoken");
    env::set_var("BROADCAST_RATE_PER_SEC", "10");

    let config = BotConfig::load(None).unwrap();

    assert_eq!(config.database_url(), "custom.db");
    assert_eq!(config.webhook.secret, "s3cret_value-1");
    assert_eq!(config.webhook.listen_addr.to_string(), "127.0.0.1:9000");
    assert_eq!(
        config.webhook.endpoint().unwrap().unwrap().as_str(),
        "https://bot.example.com/tg/updates"
    );
    assert_eq!(config.admin.admin_ids, vec![42, 7]);
    assert!(config.admin.is_admin(7));
    assert!(!config.admin.is_admin(8));
    assert_eq!(config.admin.api_token.as_deref(), Some("admintoken"));
    assert_eq!(config.broadcast.rate_per_sec, 10);
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
#[serial]
fn test_load_config_with_override_token() {
    clear_env();
    env::set_var("BOT_TOKEN", "env_token");

    let config = BotConfig::load(Some("override_token".to_string())).unwrap();
    assert_eq!(config.bot_token(), "override_token");

    clear_env();
}

#[test]
#[serial]
fn test_missing_token_is_an_error() {
    clear_env();
    assert!(BotConfig::load(None).is_err());
}

#[test]
#[serial]
fn test_validate_rejects_bad_values() {
    clear_env();
    env::set_var("BOT_TOKEN", "test_token");

    env::set_var("TELEGRAM_API_URL", "not-a-valid-url");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("TELEGRAM_API_URL");

    env::set_var("WEBHOOK_URL", "http://insecure.example.com");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("WEBHOOK_URL");

    env::set_var("WEBHOOK_SECRET", "has spaces");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("WEBHOOK_SECRET");

    env::set_var("BROADCAST_RATE_PER_SEC", "100");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("BROADCAST_RATE_PER_SEC");

    env::set_var("MAX_CONCURRENT_UPDATES", "0");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("MAX_CONCURRENT_UPDATES");

    env::set_var("WEBHOOK_PATH", "/health");
    assert!(BotConfig::load(None).unwrap().validate().is_err());
    env::remove_var("WEBHOOK_PATH");

    env::set_var("UPDATE_QUEUE_CAPACITY", "many");
    assert!(BotConfig::load(None).is_err());

    clear_env();
}

#[test]
fn test_parse_admin_ids() {
    assert_eq!(parse_admin_ids("1,2, 3 ,").unwrap(), vec![1, 2, 3]);
    assert!(parse_admin_ids("").unwrap().is_empty());
    assert!(parse_admin_ids("1,abc").is_err());
}

#[test]
fn test_generated_secret_is_valid() {
    let a = crate::config::generate_webhook_secret();
    let b = crate::config::generate_webhook_secret();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert!(a
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
}

#[test]
fn test_broadcast_defaults_validate() {
    assert!(BroadcastConfig::default().validate().is_ok());
    let zero_page = BroadcastConfig {
        page_size: 0,
        ..Default::default()
    };
    assert!(zero_page.validate().is_err());
}

/// **Test: webhook paths that would clash with other routes or with axum route syntax are
/// rejected before the router is built.**
#[test]
fn test_validate_webhook_path() {
    for ok in ["/webhook", "/tg/updates", "/", "/hooks/health-check", "/administrator"] {
        assert!(validate_webhook_path(ok).is_ok(), "{} should be accepted", ok);
    }
    for bad in [
        "webhook",
        "/health",
        "/health/",
        "/admin",
        "/admin/stats",
        "/admin/broadcasts/",
        "/:token",
        "/hook/*rest",
        "/{id}",
        "/a//b",
        "/with space",
    ] {
        assert!(validate_webhook_path(bad).is_err(), "{} should be rejected", bad);
    }
}
