//! Events emitted by the streak store to registered listeners

use chrono::NaiveDate;

use crate::{DayStatus, Goal};

/// State changes reported after each successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakEvent {
    /// A new goal replaced the current one (or was set for the first time)
    GoalSet {
        goal: Goal,
        archived: Option<Goal>,
    },

    /// A day was logged
    DayLogged {
        day: NaiveDate,
        status: DayStatus,
        days_learned: u32,
        freezes_used: u32,
    },

    /// Learned days reached the goal's target
    GoalCompleted {
        goal: Goal,
        days_learned: u32,
    },

    /// The selection cursor moved
    SelectionChanged {
        day: NaiveDate,
    },

    /// All data was reset
    Cleared,

    /// State was re-read from storage
    Reloaded {
        configured: bool,
    },
}
