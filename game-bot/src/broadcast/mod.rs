//! # Broadcast
//!
//! Admins submit a text through [`BroadcastHandle`]; a single [`BroadcastWorker`] task delivers
//! it to every active user at a bounded rate. Jobs live in the `broadcasts` table, so a restart
//! resumes from the last committed page.

mod handle;
mod worker;

use std::sync::Arc;

use storage::Database;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::BroadcastConfig;
use crate::core::Bot;

pub use handle::BroadcastHandle;
pub use worker::BroadcastWorker;

/// Creates a connected handle/worker pair. Spawn `worker.run()` and hand out clones of the
/// handle. The worker exits when `shutdown` is cancelled.
pub fn channel(
    db: &Database,
    bot: Arc<dyn Bot>,
    config: BroadcastConfig,
    shutdown: CancellationToken,
) -> (BroadcastHandle, BroadcastWorker) {
    // One pending wake-up is enough: the worker drains every unfinished job per wake.
    let (wake_tx, wake_rx) = mpsc::channel(1);
    let handle = BroadcastHandle::new(db.broadcasts(), db.users(), wake_tx);
    let worker = BroadcastWorker::new(
        db.broadcasts(),
        db.users(),
        bot,
        config,
        wake_rx,
        shutdown,
    );
    (handle, worker)
}
