//! # Reminders Feature
//!
//! In-memory reminder timers fired once by a one-second ticker.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Timers kept in memory, ordered by expiry
//! - 1.0.0: Initial scheduler

pub mod scheduler;

pub use scheduler::{Delay, Reminder, ReminderScheduler, ScheduleError, TICK_INTERVAL};
