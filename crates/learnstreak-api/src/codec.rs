//! Persisted byte format of `AppData`
//!
//! The blob is a JSON object:
//!
//! ```json
//! {
//!   "version": 1,
//!   "goal": { "topic": "Rust", "duration": "Month", "startDate": 1760572800 },
//!   "streakHistory": [ { "day": 1760572800, "status": "learned" } ],
//!   "freezesUsed": 0,
//!   "goalsHistory": []
//! }
//! ```
//!
//! Days are stored as Unix seconds of the day's midnight in UTC, never as
//! formatted strings, so a blob decodes to the same days in any time zone.

use chrono::NaiveDate;
use learnstreak_util::{day_to_timestamp, timestamp_to_day};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::{AppData, DayStatus, Goal, LearningDuration, DATA_FORMAT_VERSION};

/// Errors raised while encoding or decoding persisted app data
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported data format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid day timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Day {0} is logged more than once")]
    DuplicateDay(NaiveDate),

    #[error("Day {0} is stored as unlogged")]
    UnloggedEntry(NaiveDate),

    #[error("freezesUsed is {stored} but history holds {counted} freezed days")]
    FreezeCountMismatch { stored: u32, counted: u32 },

    #[error("{used} freezes exceed the {max} allowed for a {duration} goal")]
    FreezeBudgetExceeded {
        used: u32,
        max: u32,
        duration: LearningDuration,
    },
}

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppData {
    version: u32,
    goal: Option<RawGoal>,
    streak_history: Vec<RawDayEntry>,
    freezes_used: u32,
    goals_history: Vec<RawGoal>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGoal {
    topic: String,
    duration: LearningDuration,
    start_date: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawDayEntry {
    day: i64,
    status: DayStatus,
}

impl RawGoal {
    fn from_goal(goal: &Goal) -> Self {
        Self {
            topic: goal.topic().to_string(),
            duration: goal.duration(),
            start_date: day_to_timestamp(goal.start_date()),
        }
    }

    fn into_goal(self) -> CodecResult<Goal> {
        let start_date = decode_day(self.start_date)?;
        Ok(Goal::new(self.topic, self.duration, start_date))
    }
}

fn decode_day(secs: i64) -> CodecResult<NaiveDate> {
    timestamp_to_day(secs).ok_or(CodecError::InvalidTimestamp(secs))
}

/// Serialize app data to its persisted form
pub fn encode(data: &AppData) -> CodecResult<Vec<u8>> {
    let raw = RawAppData {
        version: DATA_FORMAT_VERSION,
        goal: data.goal().map(RawGoal::from_goal),
        streak_history: data
            .streak_history()
            .iter()
            .map(|(day, status)| RawDayEntry {
                day: day_to_timestamp(*day),
                status: *status,
            })
            .collect(),
        freezes_used: data.freezes_used(),
        goals_history: data.goals_history().iter().map(RawGoal::from_goal).collect(),
    };

    Ok(serde_json::to_vec(&raw)?)
}

/// Parse and validate persisted app data
pub fn decode(bytes: &[u8]) -> CodecResult<AppData> {
    let raw: RawAppData = serde_json::from_slice(bytes)?;

    if raw.version != DATA_FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(raw.version));
    }

    let goal = raw.goal.map(RawGoal::into_goal).transpose()?;

    let mut seen = BTreeSet::new();
    let mut entries = Vec::with_capacity(raw.streak_history.len());
    for entry in raw.streak_history {
        let day = decode_day(entry.day)?;
        if !entry.status.is_logged() {
            return Err(CodecError::UnloggedEntry(day));
        }
        if !seen.insert(day) {
            return Err(CodecError::DuplicateDay(day));
        }
        entries.push((day, entry.status));
    }

    let goals_history = raw
        .goals_history
        .into_iter()
        .map(RawGoal::into_goal)
        .collect::<CodecResult<Vec<_>>>()?;

    let data = AppData::from_parts(goal, entries, goals_history);

    if data.freezes_used() != raw.freezes_used {
        return Err(CodecError::FreezeCountMismatch {
            stored: raw.freezes_used,
            counted: data.freezes_used(),
        });
    }

    if let Some(goal) = data.goal() {
        let max = goal.duration().max_freezes();
        if data.freezes_used() > max {
            return Err(CodecError::FreezeBudgetExceeded {
                used: data.freezes_used(),
                max,
                duration: goal.duration(),
            });
        }
    }

    Ok(data)
}
