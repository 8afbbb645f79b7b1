//! Submission side of the broadcast worker.

use storage::{BroadcastRecord, BroadcastRepository, UserRepository};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use crate::core::{HandlerError, Result};

/// Cheap to clone; shared by the admin chat commands and the admin HTTP API.
#[derive(Clone)]
pub struct BroadcastHandle {
    broadcasts: BroadcastRepository,
    users: UserRepository,
    wake: mpsc::Sender<()>,
}

impl BroadcastHandle {
    pub(crate) fn new(
        broadcasts: BroadcastRepository,
        users: UserRepository,
        wake: mpsc::Sender<()>,
    ) -> Self {
        Self {
            broadcasts,
            users,
            wake,
        }
    }

    /// Stores a pending job targeting all currently active users and wakes the worker.
    pub async fn submit(&self, text: &str, created_by: i64) -> Result<BroadcastRecord> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HandlerError::InvalidCommand("broadcast text is empty".to_string()).into());
        }

        let total_targets = self.users.count_active().await?;
        let record = self.broadcasts.create(text, created_by, total_targets).await?;

        match self.wake.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                warn!(
                    broadcast_id = record.id,
                    "Broadcast worker is not running; job will start on next launch"
                );
            }
        }

        info!(
            broadcast_id = record.id,
            created_by = created_by,
            total_targets = total_targets,
            "step: broadcast submitted"
        );
        Ok(record)
    }

    /// Cancels a pending or running job. Returns false when unknown or already finished.
    pub async fn cancel(&self, id: i64) -> Result<bool> {
        let cancelled = self.broadcasts.cancel(id).await?;
        info!(broadcast_id = id, cancelled, "step: broadcast cancel requested");
        Ok(cancelled)
    }

    /// Most recent jobs, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<BroadcastRecord>> {
        Ok(self.broadcasts.list_recent(limit).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Option<BroadcastRecord>> {
        Ok(self.broadcasts.get(id).await?)
    }
}
