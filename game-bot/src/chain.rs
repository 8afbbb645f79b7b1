//! Ordered handler pipeline for one inbound message.
//!
//! Phases: every `before` in registration order (a `false` ends the run with `Stop`), then
//! `handle` until one returns `Stop` or `Reply`, then every `after` in reverse order with the
//! final response. A failing `after` does not skip the remaining ones; the first such error
//! is returned once all have run.

use crate::core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

fn short_type_name(h: &dyn Handler) -> &'static str {
    let full = std::any::type_name_of_val(h);
    full.rsplit("::").next().unwrap_or(full)
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        debug!(message_id = %message.id, handlers = self.handlers.len(), "step: chain start");

        for handler in &self.handlers {
            if !handler.before(message).await? {
                info!(
                    handler = short_type_name(handler.as_ref()),
                    "step: before hook declined, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut outcome = HandlerResponse::Continue;
        for handler in &self.handlers {
            let response = handler.handle(message).await?;
            if response != HandlerResponse::Continue {
                info!(
                    handler = short_type_name(handler.as_ref()),
                    replied = matches!(response, HandlerResponse::Reply(_)),
                    "step: handled"
                );
                outcome = response;
                break;
            }
        }

        let mut first_error = None;
        for handler in self.handlers.iter().rev() {
            if let Err(e) = handler.after(message, &outcome).await {
                warn!(handler = short_type_name(handler.as_ref()), error = %e, "after hook failed");
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        debug!(message_id = %message.id, "step: chain done");
        Ok(outcome)
    }
}
