//! Core types and traits: Handler, Bot, Message, HandlerResponse, errors, logging, secret checks.
//! Transport-agnostic; the Telegram layer converts into these types.

pub mod bot;
pub mod error;
pub mod logger;
pub mod secret;
pub mod types;

pub use bot::Bot;
pub use error::{DbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use secret::secrets_match;
pub use types::{
    Chat, Handler, HandlerResponse, Invoice, Message, PaymentInfo, PreCheckout, ToCoreMessage,
    ToCoreUser, User,
};
