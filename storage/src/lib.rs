//! Storage crate: SQLite persistence for the game bot.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord, MessageRecord, GameSave, PaymentRecord, BroadcastRecord, BotStats
//! - [`database`] – Database (shared pool, schema, stats)
//! - [`user_repo`], [`message_repo`], [`game_repo`], [`payment_repo`], [`broadcast_repo`] – repositories
//! - [`sqlite_pool`] – SqlitePoolManager

mod broadcast_repo;
mod database;
mod error;
mod game_repo;
mod message_repo;
mod models;
mod payment_repo;
mod sqlite_pool;
mod user_repo;

pub use broadcast_repo::BroadcastRepository;
pub use database::Database;
pub use error::StorageError;
pub use game_repo::{validate_slot, GameRepository, MAX_GAME_DATA_BYTES, MAX_SLOT_LEN};
pub use message_repo::MessageRepository;
pub use models::{
    BotStats, BroadcastRecord, BroadcastStatus, GameSave, MessageQuery, MessageRecord,
    PaymentRecord, PaymentStatus, UserRecord, DIRECTION_RECEIVED, DIRECTION_SENT,
};
pub use payment_repo::PaymentRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;
