//! Shared types for learnstreak

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Length of a learning goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LearningDuration {
    Week,
    #[default]
    Month,
    Year,
}

impl LearningDuration {
    pub const ALL: [LearningDuration; 3] = [
        LearningDuration::Week,
        LearningDuration::Month,
        LearningDuration::Year,
    ];

    /// Freeze tokens available for a goal of this duration
    pub fn max_freezes(self) -> u32 {
        match self {
            LearningDuration::Week => 2,
            LearningDuration::Month => 8,
            LearningDuration::Year => 96,
        }
    }

    /// Learned days needed to complete a goal of this duration.
    ///
    /// Month and year are fixed approximations, not calendar lengths.
    pub fn target_days(self) -> u32 {
        match self {
            LearningDuration::Week => 7,
            LearningDuration::Month => 30,
            LearningDuration::Year => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LearningDuration::Week => "Week",
            LearningDuration::Month => "Month",
            LearningDuration::Year => "Year",
        }
    }
}

impl fmt::Display for LearningDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Learned,
    Freezed,
    /// Implicit status of any day without a history entry. Never stored.
    #[default]
    Unlogged,
}

impl DayStatus {
    pub fn is_logged(self) -> bool {
        self != DayStatus::Unlogged
    }
}

/// A learning goal. Immutable; replacing a goal creates a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Goal {
    topic: String,
    duration: LearningDuration,
    start_date: NaiveDate,
}

impl Goal {
    pub fn new(topic: impl Into<String>, duration: LearningDuration, start_date: NaiveDate) -> Self {
        Self {
            topic: topic.into(),
            duration,
            start_date,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn duration(&self) -> LearningDuration {
        self.duration
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
}

/// Canonical application state.
///
/// `freezes_used` is derived from the history and can only change through
/// [`AppData::record`] and [`AppData::start_goal`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppData {
    goal: Option<Goal>,
    streak_history: BTreeMap<NaiveDate, DayStatus>,
    freezes_used: u32,
    goals_history: Vec<Goal>,
}

impl AppData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build app data from its parts. Unlogged entries are dropped and the
    /// freeze counter is computed from the history.
    pub fn from_parts(
        goal: Option<Goal>,
        streak_history: impl IntoIterator<Item = (NaiveDate, DayStatus)>,
        goals_history: Vec<Goal>,
    ) -> Self {
        let streak_history: BTreeMap<NaiveDate, DayStatus> = streak_history
            .into_iter()
            .filter(|(_, status)| status.is_logged())
            .collect();
        let freezes_used = count_status(&streak_history, DayStatus::Freezed);

        Self {
            goal,
            streak_history,
            freezes_used,
            goals_history,
        }
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn streak_history(&self) -> &BTreeMap<NaiveDate, DayStatus> {
        &self.streak_history
    }

    pub fn freezes_used(&self) -> u32 {
        self.freezes_used
    }

    pub fn goals_history(&self) -> &[Goal] {
        &self.goals_history
    }

    pub fn status(&self, day: NaiveDate) -> DayStatus {
        self.streak_history
            .get(&day)
            .copied()
            .unwrap_or(DayStatus::Unlogged)
    }

    pub fn is_logged(&self, day: NaiveDate) -> bool {
        self.status(day).is_logged()
    }

    pub fn days_learned(&self) -> u32 {
        count_status(&self.streak_history, DayStatus::Learned)
    }

    /// Freeze budget of the current goal, 0 without a goal
    pub fn max_freezes(&self) -> u32 {
        self.goal
            .as_ref()
            .map(|g| g.duration.max_freezes())
            .unwrap_or(0)
    }

    pub fn freezes_remaining(&self) -> u32 {
        self.max_freezes().saturating_sub(self.freezes_used)
    }

    pub fn is_configured(&self) -> bool {
        self.goal.is_some()
    }

    pub fn is_goal_completed(&self) -> bool {
        match &self.goal {
            Some(goal) => self.days_learned() >= goal.duration.target_days(),
            None => false,
        }
    }

    /// Replace the current goal, archiving the previous one and starting a
    /// fresh streak. Returns the archived goal.
    pub fn start_goal(&mut self, goal: Goal) -> Option<Goal> {
        let archived = self.goal.replace(goal);
        if let Some(previous) = &archived {
            self.goals_history.push(previous.clone());
        }
        self.streak_history.clear();
        self.freezes_used = 0;
        archived
    }

    /// Record a status for a day that has no entry yet.
    ///
    /// Returns `false` (and changes nothing) if the day is already logged or
    /// `status` is `Unlogged`.
    pub fn record(&mut self, day: NaiveDate, status: DayStatus) -> bool {
        if !status.is_logged() || self.streak_history.contains_key(&day) {
            return false;
        }

        self.streak_history.insert(day, status);
        if status == DayStatus::Freezed {
            self.freezes_used += 1;
        }
        true
    }
}

fn count_status(history: &BTreeMap<NaiveDate, DayStatus>, status: DayStatus) -> u32 {
    history.values().filter(|s| **s == status).count() as u32
}

/// Read-only view of the store for UI display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub topic: Option<String>,
    pub duration: Option<LearningDuration>,
    pub start_date: Option<NaiveDate>,
    pub days_learned: u32,
    /// Learned days needed for completion, 0 without a goal
    pub target_days: u32,
    pub freezes_used: u32,
    pub max_freezes: u32,
    pub freezes_remaining: u32,
    pub is_configured: bool,
    pub is_goal_completed: bool,
    pub archived_goals: usize,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
}
