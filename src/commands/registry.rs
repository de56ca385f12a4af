//! Ordered chat command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Ordered dispatch, first handler to claim a message wins
//! - 1.0.0: Initial implementation for handler dispatch

use log::debug;
use std::sync::Arc;

use super::context::{ChatMessage, CommandContext};
use super::handler::ChatCommandHandler;
use crate::irc::OutboundLine;

/// Handlers in priority order
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(ActionMirrorHandler));
/// registry.register(Arc::new(CalcHandler));
///
/// if let Some(replies) = registry.dispatch(&ctx, &msg) {
///     sink.send_all(replies);
/// }
/// ```
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: Vec<Arc<dyn ChatCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; it is tried after every handler registered before it
    pub fn register(&mut self, handler: Arc<dyn ChatCommandHandler>) {
        self.handlers.push(handler);
    }

    /// Run handlers in order until one claims the message
    pub fn dispatch(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
        self.handlers.iter().find_map(|handler| {
            let replies = handler.handle(ctx, msg)?;
            debug!(
                "{} handled message from {} ({} repl{})",
                handler.name(),
                msg.sender,
                replies.len(),
                if replies.len() == 1 { "y" } else { "ies" }
            );
            Some(replies)
        })
    }

}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
