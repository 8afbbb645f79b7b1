use anyhow::{Context, Result};
use storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::broadcast;
use crate::components::{build_bot_components, build_handler_chain, build_router};
use crate::config::{BaseConfig, BotConfig};
use crate::core::init_tracing;
use crate::handlers::menu_commands;
use crate::telegram::{fetch_bot_username, register_commands, register_webhook};
use crate::webhook::{update_queue, UpdateDispatcher};

/// Main entry: validate config, init logging, build components, start the broadcast worker
/// and update dispatcher, register the webhook, then serve HTTP until Ctrl-C.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig, skip_set_webhook: bool) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        listen_addr = %config.webhook.listen_addr,
        webhook_path = %config.webhook.path,
        admins = config.admin.admin_ids.len(),
        "Initializing bot"
    );

    let components = build_bot_components(&config, None).await?;
    fetch_bot_username(&components.teloxide_bot, &components.bot_username).await?;

    let shutdown = CancellationToken::new();
    let (broadcasts, worker) = broadcast::channel(
        &components.db,
        components.bot.clone(),
        config.broadcast.clone(),
        shutdown.clone(),
    );
    let worker_task = tokio::spawn(worker.run());

    let chain = build_handler_chain(&components, config.admin.admin_ids.clone(), broadcasts.clone());
    let (queue_tx, queue_rx) = update_queue(config.webhook.queue_capacity);
    let dispatcher = UpdateDispatcher::new(chain, components.teloxide_bot.clone(), queue_rx)
        .with_max_in_flight(config.webhook.max_in_flight);
    let dispatcher_task = tokio::spawn(dispatcher.run());

    if skip_set_webhook {
        warn!("Skipping setWebhook; Telegram must already point at this server");
    } else {
        let endpoint = config
            .webhook
            .endpoint()?
            .context("WEBHOOK_URL is required to register the webhook (or pass --skip-set-webhook)")?;
        register_webhook(&components.teloxide_bot, endpoint, &config.webhook.secret).await?;
        register_commands(&components.teloxide_bot, menu_commands()).await;
    }

    let app = build_router(&config, components.db.clone(), queue_tx, broadcasts);
    let listener = tokio::net::TcpListener::bind(config.webhook.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.webhook.listen_addr))?;

    info!(addr = %config.webhook.listen_addr, "Bot started successfully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // Stop the worker; the dispatcher ends once the router (and its queue sender) is dropped.
    shutdown.cancel();
    if let Err(e) = dispatcher_task.await {
        error!(error = %e, "Dispatcher task failed");
    }
    if let Err(e) = worker_task.await {
        error!(error = %e, "Broadcast worker task failed");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => info!("Received shutdown signal, cleaning up..."),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl-C; waiting for cancellation");
                token.cancelled().await;
            }
        },
        _ = token.cancelled() => {}
    }
}

/// Prints aggregate counters as pretty JSON.
pub async fn print_stats() -> Result<()> {
    let db = Database::connect(&BaseConfig::database_url_from_env()).await?;
    let stats = db.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Deletes message log entries older than `days`.
pub async fn cleanup_messages(days: u32) -> Result<u64> {
    let db = Database::connect(&BaseConfig::database_url_from_env()).await?;
    let deleted = db.messages().delete_older_than(days).await?;
    println!("Deleted {} messages older than {} days", deleted, days);
    Ok(deleted)
}
