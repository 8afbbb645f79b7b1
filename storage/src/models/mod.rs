//! Data models for storage (users, message log, game saves, payments, broadcasts, stats).
//!
//! Used by the repositories and callers of the storage API.

mod bot_stats;
mod broadcast_record;
mod game_save;
mod message_query;
mod message_record;
mod payment_record;
mod user_record;

pub use bot_stats::BotStats;
pub use broadcast_record::{BroadcastRecord, BroadcastStatus};
pub use game_save::GameSave;
pub use message_query::MessageQuery;
pub use message_record::{MessageRecord, DIRECTION_RECEIVED, DIRECTION_SENT};
pub use payment_record::{PaymentRecord, PaymentStatus};
pub use user_record::UserRecord;
