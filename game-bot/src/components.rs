//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use storage::Database;
use teloxide::types::Update;
use tokio::sync::{mpsc, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use crate::admin_api::{self, AdminApiState};
use crate::broadcast::BroadcastHandle;
use crate::chain::HandlerChain;
use crate::config::BotConfig;
use crate::core::Bot;
use crate::handlers::{
    AdminHandler, BotUsername, CommandHandler, GameHandler, PaymentHandler, PersistenceHandler,
    UserRegistryHandler,
};
use crate::telegram::{build_teloxide_bot, TelegramBotAdapter};
use crate::webhook::{self, WebhookState};

/// Core dependencies for the runner; produced by the component factory.
#[derive(Clone)]
pub struct BotComponents {
    pub db: Database,
    /// Raw client, used for setup calls and pre-checkout answers.
    pub teloxide_bot: teloxide::Bot,
    /// Outbound operations used by handlers and the broadcast worker.
    pub bot: Arc<dyn Bot>,
    pub bot_username: BotUsername,
}

/// Opens the database and builds the Telegram clients. `bot_override` replaces the
/// Telegram-backed [`Bot`] (tests inject a recording mock).
#[instrument(skip(config, bot_override))]
pub async fn build_bot_components(
    config: &BotConfig,
    bot_override: Option<Arc<dyn Bot>>,
) -> Result<BotComponents> {
    let db = Database::connect(config.database_url()).await.map_err(|e| {
        error!(
            error = %e,
            database_url = %config.database_url(),
            "Failed to initialize storage"
        );
        anyhow::anyhow!("Failed to initialize storage: {}", e)
    })?;

    let teloxide_bot = build_teloxide_bot(config.bot_token(), config.telegram_api_url())?;
    let bot: Arc<dyn Bot> = match bot_override {
        Some(bot) => bot,
        None => Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())),
    };

    info!(database_url = %config.database_url(), "Bot components ready");

    Ok(BotComponents {
        db,
        teloxide_bot,
        bot,
        bot_username: Arc::new(RwLock::new(None)),
    })
}

/// Chain order: registry → persistence → admin → payments → game → general commands.
pub fn build_handler_chain(
    components: &BotComponents,
    admin_ids: Vec<i64>,
    broadcasts: BroadcastHandle,
) -> HandlerChain {
    let db = &components.db;
    let bot = components.bot.clone();
    let username = components.bot_username.clone();

    HandlerChain::new()
        .add_handler(Arc::new(UserRegistryHandler::new(db.users())))
        .add_handler(Arc::new(PersistenceHandler::new(db.messages())))
        .add_handler(Arc::new(AdminHandler::new(
            admin_ids,
            db.clone(),
            broadcasts,
            bot.clone(),
            username.clone(),
        )))
        .add_handler(Arc::new(PaymentHandler::new(
            db.payments(),
            bot.clone(),
            username.clone(),
        )))
        .add_handler(Arc::new(GameHandler::new(
            db.games(),
            bot.clone(),
            username.clone(),
        )))
        .add_handler(Arc::new(CommandHandler::new(db.users(), bot, username)))
}

/// HTTP surface: webhook + health, plus the admin API when a token is configured.
pub fn build_router(
    config: &BotConfig,
    db: Database,
    queue: mpsc::Sender<Update>,
    broadcasts: BroadcastHandle,
) -> Router {
    let mut app = webhook::router(
        &config.webhook.path,
        WebhookState::new(config.webhook.secret.clone(), queue),
    );

    if let Some(token) = config.admin.api_token.as_deref() {
        info!("Admin API enabled");
        app = app.merge(admin_api::router(AdminApiState {
            token: Arc::from(token),
            db,
            broadcasts,
        }));
    }

    app.layer(TraceLayer::new_for_http())
}
