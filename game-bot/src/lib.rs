//! # game-bot
//!
//! Telegram bot backend: webhook receiver, SQLite persistence (users, message log, game saves,
//! Stars payments, broadcasts), a rate-limited broadcast worker, and admin commands plus an
//! optional admin HTTP API.
//!
//! ## Modules
//!
//! - [`core`] – transport-agnostic types, Bot and Handler traits, errors, logging
//! - [`chain`] – handler chain (before → handle → after)
//! - [`telegram`] – teloxide adapters and setup calls
//! - [`webhook`] – HTTP endpoint, update queue, dispatcher
//! - [`handlers`] – chain handlers
//! - [`payments`] – Stars invoices and pre-checkout validation
//! - [`broadcast`] – broadcast handle and worker
//! - [`admin_api`] – bearer-token HTTP admin routes
//! - [`config`], [`components`], [`runner`], [`cli`]

pub mod admin_api;
pub mod broadcast;
pub mod chain;
pub mod cli;
pub mod components;
pub mod config;
pub mod core;
pub mod handlers;
pub mod payments;
pub mod runner;
pub mod telegram;
pub mod webhook;

pub use chain::HandlerChain;
pub use cli::{Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, build_router, BotComponents};
pub use config::BotConfig;
pub use crate::core::{
    Bot, Chat, DbotError, Handler, HandlerError, HandlerResponse, Invoice, Message, PaymentInfo,
    PreCheckout, Result, User,
};
pub use runner::{cleanup_messages, print_stats, run_bot};
