//! Opaque per-user game save; maps to the `game_saves` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One save slot. `version` starts at 1 and increments on every overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameSave {
    pub user_id: i64,
    pub slot: String,
    pub data: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
