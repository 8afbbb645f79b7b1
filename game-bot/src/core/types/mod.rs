//! Core types: user, chat, message, payments, handler response, and Handler trait.
//!
//! One file per main type.

mod chat;
mod handler;
mod message;
mod payment;
mod response;
mod user;

pub use chat::Chat;
pub use handler::{Handler, ToCoreMessage, ToCoreUser};
pub use message::Message;
pub use payment::{Invoice, PaymentInfo, PreCheckout};
pub use response::HandlerResponse;
pub use user::User;
