// Core layer - configuration and shared helpers
pub mod core;

// Features layer - expression evaluation and reminders
pub mod features;

// Protocol layer - framing, parsing and the server connection
pub mod irc;

// Application layer - event routing and chat commands
pub mod commands;

pub use crate::core::Config;
pub use commands::CommandRouter;
pub use features::{ExprEvaluator, ReminderScheduler};
pub use irc::{NotificationSink, Session};
