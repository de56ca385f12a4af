//! Chat command handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Handlers claim messages by content instead of by name
//! - 1.0.0: Initial implementation for modular command handling

use super::context::{ChatMessage, CommandContext};
use crate::irc::OutboundLine;

/// Trait for chat command handlers
///
/// Handlers are tried in registration order. A handler that recognises the
/// message returns `Some(replies)`, possibly empty, and stops the search.
///
/// # Example
///
/// ```ignore
/// pub struct EchoHandler;
///
/// impl ChatCommandHandler for EchoHandler {
///     fn name(&self) -> &'static str {
///         "echo"
///     }
///
///     fn handle(&self, _ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
///         let text = msg.text.strip_prefix(".echo ")?;
///         Some(vec![msg.reply(text)])
///     }
/// }
/// ```
pub trait ChatCommandHandler: Send + Sync {
    /// Name used in logs and registry lookups
    fn name(&self) -> &'static str;

    /// Handle the message, or return `None` to pass it on
    fn handle(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe (can be used with dyn)
    fn _assert_object_safe(_: &dyn ChatCommandHandler) {}
}
