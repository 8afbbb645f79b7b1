//! Queue consumer: routes each update to the handler chain or the pre-checkout answer.
//!
//! Messages of one chat are handled strictly in arrival order by a per-chat worker task.
//! Chats run in parallel, but at most `max_in_flight` messages are accepted and not yet
//! handled at any time. A permit is taken before an update leaves the queue, so a slow chain
//! backs up the bounded queue and the webhook starts answering 503.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use teloxide::{
    payloads::AnswerPreCheckoutQuerySetters,
    prelude::*,
    types::{PreCheckoutQuery, Update, UpdateKind},
};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::chain::HandlerChain;
use crate::core::{Message, ToCoreMessage};
use crate::payments::validate_pre_checkout;
use crate::telegram::{TelegramMessageWrapper, TelegramPreCheckoutWrapper};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

type Job = (Message, OwnedSemaphorePermit);

/// Sender side of one chat's worker. `pending` counts jobs sent but not yet handled.
struct ChatLane {
    jobs: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

pub struct UpdateDispatcher {
    chain: HandlerChain,
    telegram: teloxide::Bot,
    queue: mpsc::Receiver<Update>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl UpdateDispatcher {
    /// `telegram` answers pre-checkout queries; everything else goes through `chain`.
    pub fn new(chain: HandlerChain, telegram: teloxide::Bot, queue: mpsc::Receiver<Update>) -> Self {
        Self {
            chain,
            telegram,
            queue,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_IN_FLIGHT)),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Caps accepted-but-unhandled messages across all chats (minimum 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        self.permits = Arc::new(Semaphore::new(max_in_flight));
        self.max_in_flight = max_in_flight;
        self
    }

    /// Runs until every queue sender is dropped, then waits for in-flight chain runs.
    pub async fn run(mut self) {
        info!(
            handlers = self.chain.len(),
            max_in_flight = self.max_in_flight,
            "Update dispatcher started"
        );
        let mut lanes: HashMap<i64, ChatLane> = HashMap::new();
        let mut workers = JoinSet::new();

        loop {
            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };
            let Some(update) = self.queue.recv().await else {
                break;
            };

            match update.kind {
                UpdateKind::Message(msg) => {
                    let message = TelegramMessageWrapper(&msg).to_core();
                    self.route(message, permit, &mut lanes, &mut workers);
                }
                UpdateKind::PreCheckoutQuery(query) => {
                    self.answer_pre_checkout(query).await;
                    drop(permit);
                }
                other => debug!(kind = ?other, "Ignoring unsupported update"),
            }

            while let Some(finished) = workers.try_join_next() {
                if let Err(e) = finished {
                    error!(error = %e, "Chat worker panicked");
                }
            }
        }

        info!(chats = lanes.len(), "Update queue closed, draining chat workers");
        lanes.clear();
        while let Some(finished) = workers.join_next().await {
            if let Err(e) = finished {
                error!(error = %e, "Chat worker panicked");
            }
        }
        info!("Update dispatcher stopped");
    }

    /// Hands the message to its chat's worker, starting one if the chat has none.
    fn route(
        &self,
        message: Message,
        permit: OwnedSemaphorePermit,
        lanes: &mut HashMap<i64, ChatLane>,
        workers: &mut JoinSet<()>,
    ) {
        // Only this task sends, so a lane at zero pending has nothing queued; dropping its
        // sender lets the idle worker exit.
        lanes.retain(|_, lane| lane.pending.load(Ordering::SeqCst) > 0);

        let chat_id = message.chat.id;
        let lane = lanes.entry(chat_id).or_insert_with(|| {
            let (jobs, rx) = mpsc::unbounded_channel();
            let pending = Arc::new(AtomicUsize::new(0));
            workers.spawn(chat_worker(self.chain.clone(), rx, pending.clone()));
            debug!(chat_id, "step: chat worker started");
            ChatLane { jobs, pending }
        });

        lane.pending.fetch_add(1, Ordering::SeqCst);
        if lane.jobs.send((message, permit)).is_err() {
            lane.pending.fetch_sub(1, Ordering::SeqCst);
            error!(chat_id, "Chat worker is gone; message dropped");
            lanes.remove(&chat_id);
        }
    }

    /// Telegram cancels the checkout if no answer arrives within 10 seconds, so this runs
    /// inline rather than through the chain.
    #[instrument(skip(self, query), fields(user_id = query.from.id.0))]
    async fn answer_pre_checkout(&self, query: PreCheckoutQuery) {
        let checkout = TelegramPreCheckoutWrapper(&query).to_core();
        let result = match validate_pre_checkout(&checkout) {
            Ok(()) => {
                info!(amount = checkout.total_amount, "step: pre-checkout approved");
                self.telegram
                    .answer_pre_checkout_query(query.id.clone(), true)
                    .await
            }
            Err(reason) => {
                warn!(reason = %reason, payload = %checkout.invoice_payload, "Pre-checkout rejected");
                self.telegram
                    .answer_pre_checkout_query(query.id.clone(), false)
                    .error_message(reason)
                    .await
            }
        };
        if let Err(e) = result {
            error!(error = %e, "Failed to answer pre-checkout query");
        }
    }
}

/// Runs the chain for one chat's messages in order; exits when the dispatcher drops the lane.
async fn chat_worker(
    chain: HandlerChain,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    pending: Arc<AtomicUsize>,
) {
    while let Some((message, permit)) = jobs.recv().await {
        if let Err(e) = chain.handle(&message).await {
            error!(
                error = %e,
                user_id = message.user.id,
                chat_id = message.chat.id,
                "Handler chain failed"
            );
        }
        drop(permit);
        pending.fetch_sub(1, Ordering::SeqCst);
    }
}
