//! # Reminder Scheduler
//!
//! Time-ordered set of pending reminders. Reminders are keyed by
//! `(expires_at, id)` so same-instant reminders never collide, and an id
//! index makes cancellation a direct lookup.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Ids decoupled from expiry time; owned instance instead of a global
//! - 1.0.0: Initial one-second tick scheduler

use chrono::{DateTime, Duration as TimeDelta, Utc};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::irc::{NotificationSink, OutboundLine};

/// How often due reminders are checked
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Delay requested by a schedule command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delay {
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Delay {
    pub fn is_zero(&self) -> bool {
        *self == Delay::default()
    }

    /// `(weeks*7 + days)` days plus `hours*3600 + minutes*60 + seconds` seconds
    pub fn to_duration(&self) -> Option<TimeDelta> {
        let days = self.weeks.checked_mul(7)?.checked_add(self.days)?;
        let secs = self
            .hours
            .checked_mul(3600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)?;

        let days = TimeDelta::try_days(i64::try_from(days).ok()?)?;
        let secs = TimeDelta::try_seconds(i64::try_from(secs).ok()?)?;
        days.checked_add(&secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("delay must be longer than zero")]
    ZeroDelay,
    #[error("delay is out of range")]
    OutOfRange,
}

/// A pending delayed notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Reminder {
    /// Line delivered to the reminder's target when it fires
    pub fn fired_line(&self) -> OutboundLine {
        OutboundLine::privmsg(&self.to, &format!("{}: ding! {}", self.from, self.message))
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    by_expiry: BTreeMap<(DateTime<Utc>, u64), Reminder>,
    expiry_by_id: HashMap<u64, DateTime<Utc>>,
    last_id: u64,
}

/// Owns every pending reminder behind one lock.
///
/// Built once by the composition root and shared as `Arc<ReminderScheduler>`
/// between the router and the tick task.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    state: Mutex<SchedulerState>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule a reminder `delay` after `now`
    pub fn create_at(
        &self,
        from: &str,
        to: &str,
        message: &str,
        delay: Delay,
        now: DateTime<Utc>,
    ) -> Result<Reminder, ScheduleError> {
        if delay.is_zero() {
            return Err(ScheduleError::ZeroDelay);
        }
        let expires_at = delay
            .to_duration()
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(ScheduleError::OutOfRange)?;

        let mut state = self.lock();
        state.last_id += 1;
        let reminder = Reminder {
            id: state.last_id,
            from: from.to_string(),
            to: to.to_string(),
            message: message.to_string(),
            created_at: now,
            expires_at,
        };
        state.expiry_by_id.insert(reminder.id, expires_at);
        state
            .by_expiry
            .insert((expires_at, reminder.id), reminder.clone());

        debug!(
            "Scheduled reminder #{} from {} to {} at {}",
            reminder.id, reminder.from, reminder.to, reminder.expires_at
        );
        Ok(reminder)
    }

    /// All pending reminders, earliest first
    pub fn list(&self) -> Vec<Reminder> {
        self.lock().by_expiry.values().cloned().collect()
    }

    /// Pending reminders addressed to `to`, earliest first
    pub fn list_for(&self, to: &str) -> Vec<Reminder> {
        self.lock()
            .by_expiry
            .values()
            .filter(|r| r.to == to)
            .cloned()
            .collect()
    }

    /// Remove a pending reminder. Returns whether it existed.
    pub fn cancel(&self, id: u64) -> bool {
        let mut state = self.lock();
        match state.expiry_by_id.remove(&id) {
            Some(expires_at) => {
                state.by_expiry.remove(&(expires_at, id));
                debug!("Cancelled reminder #{id}");
                true
            }
            None => false,
        }
    }

    /// Remove and return every reminder due at `now`, earliest first
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        let mut state = self.lock();
        let mut fired = Vec::new();

        while let Some(entry) = state.by_expiry.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let reminder = entry.remove();
            state.expiry_by_id.remove(&reminder.id);
            fired.push(reminder);
        }

        fired
    }

    pub fn len(&self) -> usize {
        self.lock().by_expiry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tick every [`TICK_INTERVAL`] until `shutdown` is cancelled,
    /// delivering fired reminders through `sink`.
    pub async fn run(self: Arc<Self>, sink: NotificationSink, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("⏰ Reminder scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    for reminder in self.tick(Utc::now()) {
                        info!("Reminder #{} fired for {} in {}", reminder.id, reminder.from, reminder.to);
                        sink.send(&reminder.fired_line());
                    }
                }
            }
        }

        info!("Reminder scheduler stopped");
    }

    /// Drop every pending reminder; returns how many were discarded
    pub fn shutdown(&self) -> usize {
        let mut state = self.lock();
        let discarded = state.by_expiry.len();
        state.by_expiry.clear();
        state.expiry_by_id.clear();
        if discarded > 0 {
            info!("Discarding {discarded} pending reminder(s) on shutdown");
        }
        discarded
    }
}
