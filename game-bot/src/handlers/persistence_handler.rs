use async_trait::async_trait;
use storage::{MessageRecord, MessageRepository};
use tracing::{error, info, instrument};

use crate::core::{HandlerResponse, Handler, Message, Result};

/// Logs the incoming message in `before` and the bot's reply (if any) in `after`.
#[derive(Clone)]
pub struct PersistenceHandler {
    repo: MessageRepository,
}

impl PersistenceHandler {
    pub fn new(repo: MessageRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler for PersistenceHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let record = MessageRecord::received(
            message.user.id,
            message.chat.id,
            message.message_type.as_str(),
            message.content.as_str(),
        )
        .with_profile(
            message.user.username.clone(),
            message.user.first_name.clone(),
            message.user.last_name.clone(),
        );

        self.repo.save(&record).await.map_err(|e| {
            error!(error = %e, user_id = message.user.id, "Failed to save message");
            e
        })?;

        info!(
            user_id = message.user.id,
            message_id = %message.id,
            "step: PersistenceHandler before done, message saved"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        let HandlerResponse::Reply(text) = response else {
            return Ok(());
        };

        let record = MessageRecord::sent(message.user.id, message.chat.id, text.as_str())
            .with_profile(
                message.user.username.clone(),
                message.user.first_name.clone(),
                message.user.last_name.clone(),
            );

        // Reply already delivered; a failed log write is only reported.
        if let Err(e) = self.repo.save(&record).await {
            error!(error = %e, user_id = message.user.id, "Failed to save reply");
        } else {
            info!(
                user_id = message.user.id,
                chat_id = message.chat.id,
                "step: PersistenceHandler after, reply saved"
            );
        }
        Ok(())
    }
}
