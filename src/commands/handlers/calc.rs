//! Calculator handler
//!
//! Handles: `?<expression>`
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use log::debug;

use crate::commands::context::{ChatMessage, CommandContext};
use crate::commands::handler::ChatCommandHandler;
use crate::features::calc::{format_number, prepare};
use crate::irc::OutboundLine;

/// Leading character of an expression query
const QUERY_MARKER: char = '?';

/// Handler for arithmetic queries
pub struct CalcHandler;

impl ChatCommandHandler for CalcHandler {
    fn name(&self) -> &'static str {
        "calc"
    }

    fn handle(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
        let query = msg.text.strip_prefix(QUERY_MARKER)?;
        if query.is_empty() {
            return None;
        }

        let expression = prepare(query);
        let replies = match ctx.evaluator.evaluate(&expression) {
            Err(e) => vec![msg.reply_to_sender(&e)],
            Ok(value) if value.is_nan() => {
                debug!("Suppressing NaN result for {expression:?}");
                vec![]
            }
            Ok(value) => vec![msg.reply_to_sender(&format_number(value))],
        };
        Some(replies)
    }
}
