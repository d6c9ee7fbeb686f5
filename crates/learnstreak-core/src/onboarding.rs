//! Goal entry form state

use learnstreak_api::{Goal, LearningDuration};
use learnstreak_util::{Result, StreakError};

use crate::StreakStore;

/// Topic and duration being edited before a goal is started
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoalDraft {
    pub topic: String,
    pub duration: LearningDuration,
}

impl GoalDraft {
    pub fn new(topic: impl Into<String>, duration: LearningDuration) -> Self {
        Self {
            topic: topic.into(),
            duration,
        }
    }

    /// Draft pre-filled from the store's current goal, or empty with the
    /// default duration
    pub fn from_store(store: &StreakStore) -> Self {
        store
            .goal()
            .map(|g| Self::new(g.topic(), g.duration()))
            .unwrap_or_default()
    }

    /// Topic with surrounding whitespace removed
    pub fn cleaned_topic(&self) -> &str {
        self.topic.trim()
    }

    pub fn is_submittable(&self) -> bool {
        !self.cleaned_topic().is_empty()
    }

    /// Start the drafted goal on `store`
    pub fn submit(&self, store: &StreakStore) -> Result<Goal> {
        if !self.is_submittable() {
            return Err(StreakError::EmptyTopic);
        }
        Ok(store.set_goal(self.cleaned_topic(), self.duration))
    }
}
