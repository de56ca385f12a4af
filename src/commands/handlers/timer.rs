//! Timer command handlers
//!
//! Handles: `.t <delay> <message>`, `.t all`, `.t cancel <id>`
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Listing only shows timers for the current channel
//! - 1.0.0: Initial schedule/list/cancel commands

use chrono::Local;
use log::{debug, info};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::commands::context::{ChatMessage, CommandContext};
use crate::commands::handler::ChatCommandHandler;
use crate::core::format::{expiry_timestamp, relative_expiry};
use crate::features::reminders::Delay;
use crate::irc::OutboundLine;

pub const USAGE: &str = "Invalid syntax: .t <time> <message>";
pub const NO_TIMERS: &str = "No timer for this channel.";
pub const CANCELLED: &str = "Timer cancelled.";
pub const NOT_FOUND: &str = "No timer with this key found!";

static SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\.t\s*",
        r"(?:(\d+)w)?",
        r"(?:(\d+)d)?",
        r"(?:(\d+)h)?",
        r"(?:(\d+)m)?",
        r"(?:(\d+)s)?",
        r"\s+(\S.*)$",
    ))
    .expect("schedule pattern is valid")
});

static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.t all$").expect("list pattern is valid"));

static CANCEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.t cancel #?(\d+)$").expect("cancel pattern is valid"));

static USAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.t\s").expect("usage pattern is valid"));

/// Handler for the timer command family
pub struct TimerHandler;

impl ChatCommandHandler for TimerHandler {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn handle(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
        if let Some(replies) = self.handle_schedule(ctx, msg) {
            return Some(replies);
        }
        if LIST_RE.is_match(&msg.text) {
            return Some(self.handle_list(ctx, msg));
        }
        if let Some(caps) = CANCEL_RE.captures(&msg.text) {
            return Some(self.handle_cancel(ctx, msg, &caps[1]));
        }
        if USAGE_RE.is_match(&msg.text) {
            return Some(vec![msg.reply(USAGE)]);
        }
        None
    }
}

impl TimerHandler {
    /// `.t 1w2d3h4m5s message` - create a timer.
    ///
    /// Returns `None` when the text is not a valid schedule so the list,
    /// cancel and usage forms get their turn.
    fn handle_schedule(&self, ctx: &CommandContext, msg: &ChatMessage) -> Option<Vec<OutboundLine>> {
        let caps = SCHEDULE_RE.captures(&msg.text)?;
        let delay = Self::parse_delay(&caps)?;
        if delay.is_zero() {
            return None;
        }
        let message = caps.get(6)?.as_str();

        let reminder = match ctx.scheduler.create_at(
            &msg.sender,
            &msg.target,
            message,
            delay,
            msg.received_at,
        ) {
            Ok(reminder) => reminder,
            Err(e) => {
                debug!("Rejected timer from {}: {e}", msg.sender);
                return None;
            }
        };

        info!(
            "Created timer #{} for {} in {} ({})",
            reminder.id, reminder.from, reminder.to, reminder.expires_at
        );

        Some(vec![msg.reply(&format!(
            "[timer added] {} ({})",
            reminder.message,
            expiry_timestamp(reminder.expires_at, &Local)
        ))])
    }

    /// `.t all` - list timers for this target
    fn handle_list(&self, ctx: &CommandContext, msg: &ChatMessage) -> Vec<OutboundLine> {
        let reminders = ctx.scheduler.list_for(&msg.target);
        if reminders.is_empty() {
            return vec![msg.reply(NO_TIMERS)];
        }

        reminders
            .iter()
            .map(|r| {
                msg.reply(&format!(
                    "#{} - {} {}",
                    r.id,
                    r.message,
                    relative_expiry(r.expires_at, msg.received_at, &Local)
                ))
            })
            .collect()
    }

    /// `.t cancel #<id>` - cancel a timer
    fn handle_cancel(&self, ctx: &CommandContext, msg: &ChatMessage, id: &str) -> Vec<OutboundLine> {
        let cancelled = id
            .parse::<u64>()
            .map(|id| ctx.scheduler.cancel(id))
            .unwrap_or(false);

        if cancelled {
            info!("{} cancelled timer #{id}", msg.sender);
            vec![msg.reply(CANCELLED)]
        } else {
            vec![msg.reply(NOT_FOUND)]
        }
    }

    /// Read the five optional counts; absent groups are zero
    fn parse_delay(caps: &Captures<'_>) -> Option<Delay> {
        let count = |i: usize| -> Option<u64> {
            match caps.get(i) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(0),
            }
        };

        Some(Delay {
            weeks: count(1)?,
            days: count(2)?,
            hours: count(3)?,
            minutes: count(4)?,
            seconds: count(5)?,
        })
    }
}
