//! Shared context for chat command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Scheduler and evaluator passed in explicitly
//! - 1.0.0: Initial implementation with core shared state

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::features::calc::Evaluator;
use crate::features::reminders::ReminderScheduler;
use crate::irc::{OutboundLine, ParsedLine};

/// Services every chat command handler can use
#[derive(Clone)]
pub struct CommandContext {
    /// The bot's own nickname
    pub nickname: String,
    pub scheduler: Arc<ReminderScheduler>,
    pub evaluator: Arc<dyn Evaluator>,
}

impl CommandContext {
    pub fn new(
        nickname: &str,
        scheduler: Arc<ReminderScheduler>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            nickname: nickname.to_string(),
            scheduler,
            evaluator,
        }
    }
}

/// A chat message reduced to what the handlers look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    /// Where replies go: the channel, or the sender for private messages
    pub target: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_line(line: &ParsedLine, received_at: DateTime<Utc>) -> Self {
        let sender = line.nick().to_string();
        let recipient = line.recipient();
        let target = if recipient.starts_with('#') {
            recipient.to_string()
        } else {
            sender.clone()
        };

        ChatMessage {
            sender,
            target,
            text: line.text(),
            received_at,
        }
    }

    /// A reply addressed to this message's target
    pub fn reply(&self, text: &str) -> OutboundLine {
        OutboundLine::privmsg(&self.target, text)
    }

    /// A reply prefixed with the sender's nick
    pub fn reply_to_sender(&self, text: &str) -> OutboundLine {
        self.reply(&format!("{}: {}", self.sender, text))
    }
}
