//! Keeps the user registry (broadcast audience) up to date.

use async_trait::async_trait;
use storage::{UserRecord, UserRepository};
use tracing::{debug, instrument};

use crate::core::{Handler, Message, Result};

/// Upserts every private-chat sender in `before`. Group and channel traffic is not registered:
/// only users who talk to the bot directly can be messaged by broadcasts.
pub struct UserRegistryHandler {
    users: UserRepository,
}

impl UserRegistryHandler {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler for UserRegistryHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        if message.user.id == 0 || !message.chat.is_private() {
            return Ok(true);
        }
        let record = UserRecord::new(
            message.user.id,
            message.user.username.clone(),
            message.user.first_name.clone(),
            message.user.last_name.clone(),
        );
        self.users.upsert(&record).await?;
        debug!(user_id = message.user.id, "step: user registered");
        Ok(true)
    }
}
