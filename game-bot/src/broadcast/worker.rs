//! Delivery side: one task, one job at a time, one page of users at a time.

use std::sync::Arc;
use std::time::Duration;

use storage::{BroadcastRecord, BroadcastRepository, BroadcastStatus, UserRepository};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::BroadcastConfig;
use crate::core::{Bot, Chat, DbotError, Result};

/// Result of delivering to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Failed,
    /// Shutdown arrived mid-delivery; the user has not been served and must be retried.
    Interrupted,
}

/// How a job run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobOutcome {
    Completed,
    /// Cancelled by an admin, or finished by someone else.
    Stopped,
    /// Shutdown requested; the job stays `running` and resumes on next start.
    Interrupted,
}

pub struct BroadcastWorker {
    broadcasts: BroadcastRepository,
    users: UserRepository,
    bot: Arc<dyn Bot>,
    config: BroadcastConfig,
    wake: mpsc::Receiver<()>,
    shutdown: CancellationToken,
}

impl BroadcastWorker {
    pub(crate) fn new(
        broadcasts: BroadcastRepository,
        users: UserRepository,
        bot: Arc<dyn Bot>,
        config: BroadcastConfig,
        wake: mpsc::Receiver<()>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            broadcasts,
            users,
            bot,
            config,
            wake,
            shutdown,
        }
    }

    /// Runs until the shutdown token fires. Unfinished jobs from a previous run are resumed
    /// first, then the worker sleeps until a new submission wakes it.
    pub async fn run(mut self) {
        info!(
            rate_per_sec = self.config.rate_per_sec,
            page_size = self.config.page_size,
            "Broadcast worker started"
        );

        loop {
            if let Err(e) = self.drain().await {
                error!(error = %e, "Broadcast worker failed; waiting for next submission");
            }
            if self.shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                woke = self.wake.recv() => {
                    if woke.is_none() {
                        // Every handle is gone; nothing new can arrive.
                        self.shutdown.cancelled().await;
                        break;
                    }
                }
            }
        }

        info!("Broadcast worker stopped");
    }

    /// Processes unfinished jobs oldest first until none are left.
    async fn drain(&mut self) -> Result<()> {
        loop {
            let jobs = self.broadcasts.list_unfinished().await?;
            if jobs.is_empty() {
                return Ok(());
            }
            for job in jobs {
                if self.run_job(job).await? == JobOutcome::Interrupted {
                    return Ok(());
                }
            }
        }
    }

    #[instrument(skip(self, job), fields(broadcast_id = job.id))]
    async fn run_job(&self, job: BroadcastRecord) -> Result<JobOutcome> {
        let id = job.id;
        if job.status == BroadcastStatus::Pending {
            if !self.broadcasts.mark_running(id).await? {
                return Ok(JobOutcome::Stopped);
            }
            info!(total_targets = job.total_targets, "step: broadcast started");
        } else {
            info!(
                cursor_user_id = job.cursor_user_id,
                sent = job.sent,
                failed = job.failed,
                "step: broadcast resumed"
            );
        }

        let mut ticker = interval(Duration::from_secs(1) / self.config.rate_per_sec.max(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cursor = job.cursor_user_id;
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(JobOutcome::Interrupted);
            }
            // Re-read so an admin cancel between pages takes effect.
            match self.broadcasts.get(id).await? {
                Some(current) if !current.status.is_terminal() => {}
                _ => {
                    info!(cursor_user_id = cursor, "step: broadcast stopped");
                    return Ok(JobOutcome::Stopped);
                }
            }

            let page = self
                .users
                .list_active_after(cursor, self.config.page_size)
                .await?;
            if page.is_empty() {
                return self.complete(id).await;
            }

            let (mut sent, mut failed) = (0i64, 0i64);
            let mut interrupted = false;
            for user in &page {
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => {
                        interrupted = true;
                        break;
                    }
                    _ = ticker.tick() => {}
                }
                match self.deliver(user.user_id, &job.text).await {
                    Delivery::Sent => sent += 1,
                    Delivery::Failed => failed += 1,
                    Delivery::Interrupted => {
                        interrupted = true;
                        break;
                    }
                }
                cursor = user.user_id;
            }

            self.broadcasts
                .record_progress(id, cursor, sent, failed)
                .await?;
            debug!(cursor_user_id = cursor, sent, failed, "step: broadcast page committed");

            if interrupted {
                info!(cursor_user_id = cursor, "step: broadcast paused for shutdown");
                return Ok(JobOutcome::Interrupted);
            }
            if (page.len() as i64) < self.config.page_size {
                return self.complete(id).await;
            }
        }
    }

    async fn complete(&self, id: i64) -> Result<JobOutcome> {
        if self.broadcasts.finish(id, BroadcastStatus::Completed).await? {
            if let Some(job) = self.broadcasts.get(id).await? {
                info!(sent = job.sent, failed = job.failed, "step: broadcast completed");
            }
            Ok(JobOutcome::Completed)
        } else {
            Ok(JobOutcome::Stopped)
        }
    }

    /// Sends to one user. Flood control is retried once after the requested delay.
    async fn deliver(&self, user_id: i64, text: &str) -> Delivery {
        let chat = Chat::private(user_id);
        let mut result = self.bot.send_message(&chat, text).await;

        if let Err(DbotError::RetryAfter(delay)) = result {
            warn!(user_id, delay_ms = delay.as_millis() as u64, "Rate limited, retrying once");
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Delivery::Interrupted,
                _ = tokio::time::sleep(delay) => {}
            }
            result = self.bot.send_message(&chat, text).await;
        }

        match result {
            Ok(()) => Delivery::Sent,
            Err(DbotError::BotBlocked) => {
                info!(user_id, "User blocked the bot; removing from broadcasts");
                if let Err(e) = self.users.mark_blocked(user_id).await {
                    error!(user_id, error = %e, "Failed to mark user blocked");
                }
                Delivery::Failed
            }
            Err(e) => {
                warn!(user_id, error = %e, "Broadcast delivery failed");
                Delivery::Failed
            }
        }
    }
}
