//! # Command Router
//!
//! Decides what, if anything, to send back for each parsed event.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Chat commands moved into ordered handlers
//! - 1.1.0: Re-identify when NickServ asks for a different nick
//! - 1.0.0: Initial router

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::context::{ChatMessage, CommandContext};
use super::handlers::create_all_handlers;
use super::registry::CommandRegistry;
use crate::core::config::{ChannelConfig, ServerConfig};
use crate::features::calc::Evaluator;
use crate::features::reminders::ReminderScheduler;
use crate::irc::{Event, OutboundLine, ParsedLine};

/// Nickname of the identity service
pub const IDENTITY_SERVICE: &str = "NickServ";

/// Notice text asking us to identify or change nick
pub const RENAME_REQUIRED: &str = "please choose a different nick";

/// Mode flag marking the connection as a bot
const BOT_MODE: &str = "+B";

/// Routes parsed events to replies and side effects
pub struct CommandRouter {
    nickname: String,
    password: String,
    channels: Vec<ChannelConfig>,
    ctx: CommandContext,
    registry: CommandRegistry,
}

impl CommandRouter {
    /// Build a router with the default chat handlers
    pub fn new(
        server: &ServerConfig,
        scheduler: Arc<ReminderScheduler>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }

        CommandRouter {
            nickname: server.nickname.clone(),
            password: server.password.clone(),
            channels: server.channels.clone(),
            ctx: CommandContext::new(&server.nickname, scheduler, evaluator),
            registry,
        }
    }

    /// Wire lines to send in response to `event`
    pub fn route(&self, event: &Event) -> Vec<String> {
        self.route_at(event, Utc::now())
    }

    pub fn route_at(&self, event: &Event, now: DateTime<Utc>) -> Vec<String> {
        match event {
            Event::Message(line) => self
                .route_line(line, now)
                .iter()
                .map(OutboundLine::to_wire)
                .collect(),
            Event::KeepAlive { reply } => vec![reply.clone()],
            Event::Numeric {
                meaning: Some(meaning),
                code,
                ..
            } => {
                info!("Server reply {code}: {meaning}");
                vec![]
            }
            Event::Numeric {
                meaning: None,
                line,
                ..
            } => {
                debug!("Useless message: {line}");
                vec![]
            }
            Event::Unparsed(line) => {
                debug!("Unparsed message: {line}");
                vec![]
            }
            Event::Empty => vec![],
        }
    }

    /// Replies and side effects for one user-originated line
    pub fn route_line(&self, line: &ParsedLine, now: DateTime<Utc>) -> Vec<OutboundLine> {
        let text = line.text();
        let mut out = Vec::new();

        if line.nick() == IDENTITY_SERVICE
            && line.command == "NOTICE"
            && text.contains(RENAME_REQUIRED)
        {
            info!("{IDENTITY_SERVICE} asked us to identify");
            out.extend(self.identify_sequence());
        }

        if line.command == "PRIVMSG" {
            let msg = ChatMessage::from_line(line, now);
            if let Some(replies) = self.registry.dispatch(&self.ctx, &msg) {
                out.extend(replies);
                return out;
            }
        }

        debug!(
            "{} to {} [{}]: {}",
            line.nick(),
            line.recipient(),
            line.command,
            text
        );
        out
    }

    /// `NICK` and `USER` lines sent right after connecting
    pub fn registration(&self, peer: &str) -> Vec<OutboundLine> {
        vec![
            OutboundLine::nick(&self.nickname),
            OutboundLine::user(&self.nickname, peer),
        ]
    }

    /// Set bot mode, identify with NickServ, then join every channel
    pub fn identify_sequence(&self) -> Vec<OutboundLine> {
        let mut lines = vec![
            OutboundLine::mode(&self.nickname, BOT_MODE),
            OutboundLine::privmsg(IDENTITY_SERVICE, &format!("IDENTIFY {}", self.password)),
        ];
        lines.extend(self.join_channels());
        lines
    }

    pub fn join_channels(&self) -> Vec<OutboundLine> {
        self.channels
            .iter()
            .map(|c| OutboundLine::join(&c.channel, c.password.as_deref()))
            .collect()
    }
}
