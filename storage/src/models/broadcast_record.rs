//! Broadcast job; maps to the `broadcasts` table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broadcast job state. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastStatus::Pending => "pending",
            BroadcastStatus::Running => "running",
            BroadcastStatus::Completed => "completed",
            BroadcastStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BroadcastStatus::Completed | BroadcastStatus::Cancelled)
    }
}

impl fmt::Display for BroadcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BroadcastStatus::Pending),
            "running" => Ok(BroadcastStatus::Running),
            "completed" => Ok(BroadcastStatus::Completed),
            "cancelled" => Ok(BroadcastStatus::Cancelled),
            other => Err(format!("unknown broadcast status: {}", other)),
        }
    }
}

/// One broadcast job with its delivery progress.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BroadcastRecord {
    pub id: i64,
    pub text: String,
    /// Admin user id, or 0 when submitted over the HTTP admin API.
    pub created_by: i64,
    pub status: BroadcastStatus,
    /// Active users at submission time (informational; users may join or leave during delivery).
    pub total_targets: i64,
    pub sent: i64,
    pub failed: i64,
    /// Highest user id already processed; delivery resumes after it.
    pub cursor_user_id: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
