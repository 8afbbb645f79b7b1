//! Handler chain result type.

/// Handler result for the chain. `Reply(text)` carries the text that was sent so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Stop the chain and attach the reply text that was sent.
    Reply(String),
}
