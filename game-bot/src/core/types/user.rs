//! User identity type for core messages.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names). Id 0 means the update had no sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
