//! Action mirror handler
//!
//! Echoes `/me` actions that mention the bot back with the sender's nick in
//! place of the bot's, so the bot never reacts to its own emotes.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use crate::commands::context::{ChatMessage, CommandContext};
use crate::commands::handler::ChatCommandHandler;
use crate::irc::OutboundLine;

/// Marker carried by CTCP action messages
const ACTION_MARKER: &str = "ACTION";

/// Handler that mirrors actions aimed at the bot
pub struct ActionMirrorHandler;

impl ChatCommandHandler for ActionMirrorHandler {
    fn name(&self) -> &'static str {
        "action"
    }

    fn handle(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
        if !msg.text.contains(ACTION_MARKER) || !msg.text.contains(ctx.nickname.as_str()) {
            return None;
        }

        let mirrored = msg.text.replace(ctx.nickname.as_str(), &msg.sender);
        Some(vec![msg.reply(&mirrored)])
    }
}
