//! Date and countdown formatting for reminder replies
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

const DAY_SECS: i64 = 86_400;
const QUARTER_HOUR_SECS: i64 = 900;
const MINUTE_SECS: i64 = 60;

/// `expires the DD-MM-YY at HH:MM:SS` in `tz`
pub fn expiry_timestamp<Tz>(expires_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = expires_at.with_timezone(tz);
    format!(
        "expires the {} at {}",
        local.format("%d-%m-%y"),
        local.format("%H:%M:%S")
    )
}

/// Countdown shown in reminder listings.
///
/// More than a day away shows the date, more than fifteen minutes the
/// clock time, otherwise minutes and seconds left.
pub fn relative_expiry<Tz>(expires_at: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let remaining = (expires_at - now).num_seconds().max(0);
    let local = expires_at.with_timezone(tz);

    if remaining > DAY_SECS {
        format!(
            "expires the {} at {}",
            local.format("%d-%m-%y"),
            local.format("%H:%M")
        )
    } else if remaining > QUARTER_HOUR_SECS {
        format!("expires at {}", local.format("%H:%M"))
    } else if remaining > MINUTE_SECS {
        format!(
            "expires in {} min {} secs",
            remaining / MINUTE_SECS,
            remaining % MINUTE_SECS
        )
    } else {
        format!("expires in {remaining} secs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_timestamp() {
        let at = now() + Duration::seconds(5400);
        assert_eq!(expiry_timestamp(at, &Utc), "expires the 01-03-24 at 13:30:00");

        let paris = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(expiry_timestamp(at, &paris), "expires the 01-03-24 at 14:30:00");
    }

    #[test]
    fn test_relative_expiry_tiers() {
        let rel = |secs: i64| relative_expiry(now() + Duration::seconds(secs), now(), &Utc);

        assert_eq!(rel(2 * DAY_SECS), "expires the 03-03-24 at 12:00");
        assert_eq!(rel(DAY_SECS), "expires at 12:00");
        assert_eq!(rel(3600), "expires at 13:00");
        assert_eq!(rel(QUARTER_HOUR_SECS), "expires in 15 min 0 secs");
        assert_eq!(rel(125), "expires in 2 min 5 secs");
        assert_eq!(rel(60), "expires in 60 secs");
        assert_eq!(rel(7), "expires in 7 secs");
    }

    #[test]
    fn test_overdue_reminder_counts_zero() {
        let rel = relative_expiry(now() - Duration::seconds(3), now(), &Utc);
        assert_eq!(rel, "expires in 0 secs");
    }
}
