//! # Features
//!
//! Capabilities the chat commands are built on.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0

pub mod calc;
pub mod reminders;

pub use calc::{Evaluator, ExprEvaluator};
pub use reminders::ReminderScheduler;
