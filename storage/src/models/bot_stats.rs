//! Aggregate statistics across all tables.
//!
//! Returned by Database::stats.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStats {
    pub total_users: i64,
    pub active_users: i64,
    pub blocked_users: i64,
    pub total_messages: i64,
    pub received_messages: i64,
    pub sent_messages: i64,
    pub game_saves: i64,
    pub payments: i64,
    pub stars_received: i64,
    pub broadcasts: i64,
}
