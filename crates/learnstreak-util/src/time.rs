//! Time utilities for learnstreak
//!
//! All streak state is keyed by local calendar day. This module owns the
//! start-of-day normalization used for those keys, the conversion between a
//! day and the absolute timestamp it is persisted as, and the clocks the
//! store reads "today" from.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `LEARNSTREAK_MOCK_TIME` environment variable can be
//! set to override the system time for [`now`] and [`SystemClock`]. This is
//! useful for trying out streaks that span several days.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! LEARNSTREAK_MOCK_TIME="2025-12-25 14:30:00" ./my-app
//! ```

use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::sync::{Mutex, OnceLock};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "LEARNSTREAK_MOCK_TIME";

/// Expected format of [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

/// Offset between the mock time in `value` and `real_now`.
///
/// Returns `None` when `value` does not match [`MOCK_TIME_FORMAT`] or does
/// not name a single instant in the local zone.
pub fn parse_mock_time_offset(value: &str, real_now: DateTime<Local>) -> Option<chrono::Duration> {
    let naive_dt = match NaiveDateTime::parse_from_str(value, MOCK_TIME_FORMAT) {
        Ok(dt) => dt,
        Err(_) => {
            tracing::warn!(
                mock_time = %value,
                expected_format = MOCK_TIME_FORMAT,
                "Invalid mock time format"
            );
            return None;
        }
    };

    match Local.from_local_datetime(&naive_dt).single() {
        Some(mock_dt) => Some(mock_dt.signed_duration_since(real_now)),
        None => {
            tracing::warn!(
                mock_time = %value,
                "Failed to convert mock time to local timezone"
            );
            None
        }
    }
}

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let value = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let offset = parse_mock_time_offset(&value, chrono::Local::now())?;
            tracing::info!(
                mock_time = %value,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Get the current local time, respecting mock time settings in debug builds.
///
/// In release builds, this always returns the real system time.
/// In debug builds, if `LEARNSTREAK_MOCK_TIME` is set, this returns a time
/// that advances from the mock time at the same rate as real time.
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Source of the current time for the streak store.
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by [`now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        now()
    }
}

/// Clock pinned to a settable instant, for tests and previews.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    /// Clock pinned to noon of the given day
    pub fn at_day(day: NaiveDate) -> Self {
        let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
        let at = Local
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&noon));
        Self::new(at)
    }

    pub fn set(&self, at: DateTime<Local>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    /// Move the clock forward (or backward, for negative values) by whole days
    pub fn advance_days(&self, days: i64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Normalization of a point in time to the local calendar day it falls on.
pub trait IntoDay {
    fn start_of_day(self) -> NaiveDate;
}

impl IntoDay for NaiveDate {
    fn start_of_day(self) -> NaiveDate {
        self
    }
}

impl IntoDay for NaiveDateTime {
    fn start_of_day(self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> IntoDay for DateTime<Tz> {
    fn start_of_day(self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

/// Absolute timestamp (Unix seconds) of `day` at midnight UTC.
///
/// The calendar day is fixed at encode time; decoding with
/// [`timestamp_to_day`] yields the same day whatever the local zone is then.
pub fn day_to_timestamp(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Calendar day of the absolute timestamp `secs`, read in UTC.
pub fn timestamp_to_day(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.date_naive())
}

/// Shift `day` by whole weeks.
pub fn add_weeks(day: NaiveDate, weeks: i32) -> NaiveDate {
    day.checked_add_signed(chrono::Duration::weeks(weeks as i64))
        .unwrap_or(day)
}

/// Shift `day` by whole months, keeping the day of month when it exists and
/// clamping to the last day of the target month otherwise.
pub fn add_months_clamped(day: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        day.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        day.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(day)
}
