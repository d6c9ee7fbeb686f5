//! Streak store: the single owner of learning-goal state

use chrono::NaiveDate;
use learnstreak_api::{
    decode, AppData, DayStatus, Goal, LearningDuration, StreakEvent, StreakSummary,
};
use learnstreak_store::PersistenceAdapter;
use learnstreak_util::{
    add_months_clamped, add_weeks, Clock, IntoDay, StreakError, SystemClock,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::flush::FlushWorker;

/// Why a log request was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The day already has a status
    AlreadyLogged { status: DayStatus },
    /// Enough days are learned already
    GoalCompleted,
    /// The day is after today
    FutureDate { day: NaiveDate, today: NaiveDate },
    /// No freezes left for the current goal
    FreezesExhausted { used: u32, max: u32 },
}

/// Outcome of a log request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDecision {
    Logged,
    Rejected { reasons: Vec<RejectReason> },
}

impl LogDecision {
    pub fn is_logged(&self) -> bool {
        matches!(self, LogDecision::Logged)
    }
}

/// Handle returned by [`StreakStore::subscribe`]
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&StreakEvent) + Send + Sync>;

struct State {
    data: AppData,
    selected: NaiveDate,
}

/// The streak store.
///
/// Holds the current [`AppData`] behind one mutex so every precondition check
/// and the update it guards happen atomically. Snapshots are handed to a
/// debounced flush worker; [`StreakStore::clear_all`] bypasses the debounce.
/// Listeners are called after the state lock is released.
pub struct StreakStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    adapter: Arc<dyn PersistenceAdapter>,
    flusher: FlushWorker,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl StreakStore {
    /// Open a store over `adapter` using the system clock
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, debounce: Duration) -> learnstreak_util::Result<Self> {
        Self::with_clock(adapter, Arc::new(SystemClock), debounce)
    }

    /// Open a store with an explicit clock
    pub fn with_clock(
        adapter: Arc<dyn PersistenceAdapter>,
        clock: Arc<dyn Clock>,
        debounce: Duration,
    ) -> learnstreak_util::Result<Self> {
        let data = load_data(adapter.as_ref());
        let today = clock.today();

        let flusher = FlushWorker::spawn(adapter.clone(), debounce)
            .map_err(|e| StreakError::internal(format!("failed to start flush worker: {}", e)))?;

        info!(
            adapter = %adapter.describe(),
            configured = data.is_configured(),
            days_learned = data.days_learned(),
            freezes_used = data.freezes_used(),
            max_freezes = data.max_freezes(),
            completed = data.is_goal_completed(),
            "Streak store opened"
        );

        Ok(Self {
            state: Mutex::new(State {
                data,
                selected: today,
            }),
            clock,
            adapter,
            flusher,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| {
            warn!("State lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Today's calendar day according to the store's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // Goal management

    /// Start a new goal today, archiving the current one and resetting the
    /// streak. Topic hygiene is the caller's job.
    pub fn set_goal(&self, topic: impl Into<String>, duration: LearningDuration) -> Goal {
        let today = self.today();
        let (goal, events) = {
            let mut state = self.state();
            self.start_goal_locked(&mut state, topic.into(), duration, today)
        };
        self.emit(events);
        goal
    }

    /// Restart the current goal with the same topic and duration.
    /// Returns `None` (and changes nothing) when no goal is set.
    pub fn repeat_goal(&self) -> Option<Goal> {
        let today = self.today();
        let (goal, events) = {
            let mut state = self.state();
            let current = state.data.goal()?.clone();
            debug!(topic = %current.topic(), "Repeating goal");
            self.start_goal_locked(&mut state, current.topic().to_string(), current.duration(), today)
        };
        self.emit(events);
        Some(goal)
    }

    fn start_goal_locked(
        &self,
        state: &mut State,
        topic: String,
        duration: LearningDuration,
        today: NaiveDate,
    ) -> (Goal, Vec<StreakEvent>) {
        let goal = Goal::new(topic, duration, today);
        let archived = state.data.start_goal(goal.clone());
        self.flusher.schedule(state.data.clone());

        info!(
            topic = %goal.topic(),
            duration = %duration,
            start = %today,
            archived = archived.is_some(),
            "Goal set"
        );

        let mut events = vec![StreakEvent::GoalSet {
            goal: goal.clone(),
            archived,
        }];
        events.extend(move_selection(state, today));
        (goal, events)
    }

    // Logging

    /// Mark a day as learned. The day is normalized to its calendar day.
    pub fn log_learned(&self, day: impl IntoDay) -> LogDecision {
        self.log(day.start_of_day(), DayStatus::Learned)
    }

    /// Mark a day as freezed, spending one of the goal's freezes
    pub fn log_freezed(&self, day: impl IntoDay) -> LogDecision {
        self.log(day.start_of_day(), DayStatus::Freezed)
    }

    /// Log the selected day as learned, then move the selection to the next
    /// day (never past today).
    pub fn log_selected_learned(&self) -> LogDecision {
        let today = self.today();
        let (decision, events) = {
            let mut state = self.state();
            let day = state.selected;
            let (decision, mut events) = self.log_locked(&mut state, day, DayStatus::Learned, today);
            if decision.is_logged() {
                let next = day.succ_opt().unwrap_or(day).min(today);
                events.extend(move_selection(&mut state, next));
            }
            (decision, events)
        };
        self.emit(events);
        decision
    }

    /// Log the selected day as freezed; the selection does not move
    pub fn log_selected_freezed(&self) -> LogDecision {
        let today = self.today();
        let (decision, events) = {
            let mut state = self.state();
            let day = state.selected;
            self.log_locked(&mut state, day, DayStatus::Freezed, today)
        };
        self.emit(events);
        decision
    }

    /// Whether `log_learned(day)` would be accepted right now
    pub fn can_log_learned(&self, day: impl IntoDay) -> bool {
        let today = self.today();
        check_log(&self.state().data, day.start_of_day(), DayStatus::Learned, today).is_empty()
    }

    /// Whether `log_freezed(day)` would be accepted right now
    pub fn can_log_freezed(&self, day: impl IntoDay) -> bool {
        let today = self.today();
        check_log(&self.state().data, day.start_of_day(), DayStatus::Freezed, today).is_empty()
    }

    fn log(&self, day: NaiveDate, status: DayStatus) -> LogDecision {
        let today = self.today();
        let (decision, events) = {
            let mut state = self.state();
            self.log_locked(&mut state, day, status, today)
        };
        self.emit(events);
        decision
    }

    fn log_locked(
        &self,
        state: &mut State,
        day: NaiveDate,
        status: DayStatus,
        today: NaiveDate,
    ) -> (LogDecision, Vec<StreakEvent>) {
        let reasons = check_log(&state.data, day, status, today);
        if !reasons.is_empty() {
            debug!(day = %day, status = ?status, reasons = ?reasons, "Log rejected");
            return (LogDecision::Rejected { reasons }, Vec::new());
        }

        let was_completed = state.data.is_goal_completed();
        if !state.data.record(day, status) {
            let status = state.data.status(day);
            return (
                LogDecision::Rejected {
                    reasons: vec![RejectReason::AlreadyLogged { status }],
                },
                Vec::new(),
            );
        }
        self.flusher.schedule(state.data.clone());

        let days_learned = state.data.days_learned();
        let freezes_used = state.data.freezes_used();
        info!(
            day = %day,
            status = ?status,
            days_learned,
            freezes_used,
            "Day logged"
        );

        let mut events = vec![StreakEvent::DayLogged {
            day,
            status,
            days_learned,
            freezes_used,
        }];

        if !was_completed
            && state.data.is_goal_completed()
            && let Some(goal) = state.data.goal()
        {
            info!(topic = %goal.topic(), days_learned, "Goal completed");
            events.push(StreakEvent::GoalCompleted {
                goal: goal.clone(),
                days_learned,
            });
        }

        (LogDecision::Logged, events)
    }

    // Reset and persistence

    /// Reset to empty state and clear persisted data before returning.
    ///
    /// In-memory state is reset even when clearing storage fails; the error
    /// is returned so the caller can report it.
    pub fn clear_all(&self) -> learnstreak_util::Result<()> {
        let today = self.today();
        let (result, events) = {
            let mut state = self.state();
            state.data = AppData::empty();
            let result = self.flusher.clear();

            let mut events = vec![StreakEvent::Cleared];
            events.extend(move_selection(&mut state, today));
            (result, events)
        };

        info!("All data cleared");
        self.emit(events);
        result.map_err(|e| StreakError::storage(e.to_string()))
    }

    /// Write any pending snapshot now
    pub fn flush(&self) -> learnstreak_util::Result<()> {
        self.flusher
            .flush()
            .map_err(|e| StreakError::storage(e.to_string()))
    }

    /// Flush pending writes, then re-read state from storage and reset the
    /// selection to today. If the flush fails the in-memory state is kept.
    pub fn reload(&self) -> learnstreak_util::Result<()> {
        let today = self.today();
        let events = {
            let mut state = self.state();
            self.flusher
                .flush()
                .map_err(|e| StreakError::storage(e.to_string()))?;

            state.data = load_data(self.adapter.as_ref());
            let configured = state.data.is_configured();
            info!(configured, days_learned = state.data.days_learned(), "Data reloaded");

            let mut events = vec![StreakEvent::Reloaded { configured }];
            events.extend(move_selection(&mut state, today));
            events
        };
        self.emit(events);
        Ok(())
    }

    // Selection cursor

    pub fn selected_date(&self) -> NaiveDate {
        self.state().selected
    }

    /// Move the selection to `day` (normalized to its calendar day)
    pub fn select_date(&self, day: impl IntoDay) -> NaiveDate {
        self.update_selection(|_| day.start_of_day())
    }

    /// Move the selection by whole weeks
    pub fn shift_week(&self, weeks: i32) -> NaiveDate {
        self.update_selection(|current| add_weeks(current, weeks))
    }

    /// Move the selection by whole months, clamping to the end of shorter
    /// months
    pub fn shift_month(&self, months: i32) -> NaiveDate {
        self.update_selection(|current| add_months_clamped(current, months))
    }

    fn update_selection(&self, f: impl FnOnce(NaiveDate) -> NaiveDate) -> NaiveDate {
        let (day, events) = {
            let mut state = self.state();
            let day = f(state.selected);
            let events: Vec<_> = move_selection(&mut state, day).into_iter().collect();
            (day, events)
        };
        self.emit(events);
        day
    }

    // Queries

    pub fn status(&self, day: impl IntoDay) -> DayStatus {
        self.state().data.status(day.start_of_day())
    }

    /// Statuses for every day in `from..=to`, for calendar grids.
    /// Empty when `from` is after `to`.
    pub fn status_range(&self, from: impl IntoDay, to: impl IntoDay) -> Vec<(NaiveDate, DayStatus)> {
        let (from, to) = (from.start_of_day(), to.start_of_day());
        let state = self.state();
        from.iter_days()
            .take_while(|d| *d <= to)
            .map(|d| (d, state.data.status(d)))
            .collect()
    }

    pub fn is_logged(&self, day: impl IntoDay) -> bool {
        self.state().data.is_logged(day.start_of_day())
    }

    pub fn days_learned(&self) -> u32 {
        self.state().data.days_learned()
    }

    pub fn freezes_used(&self) -> u32 {
        self.state().data.freezes_used()
    }

    pub fn max_freezes(&self) -> u32 {
        self.state().data.max_freezes()
    }

    /// Freezes left for the current goal, 0 without a goal
    pub fn freezes_remaining(&self) -> u32 {
        self.state().data.freezes_remaining()
    }

    pub fn is_configured(&self) -> bool {
        self.state().data.is_configured()
    }

    pub fn is_goal_completed(&self) -> bool {
        self.state().data.is_goal_completed()
    }

    pub fn goal(&self) -> Option<Goal> {
        self.state().data.goal().cloned()
    }

    pub fn current_topic(&self) -> Option<String> {
        self.state().data.goal().map(|g| g.topic().to_string())
    }

    pub fn duration(&self) -> Option<LearningDuration> {
        self.state().data.goal().map(|g| g.duration())
    }

    /// Archived goals, oldest first
    pub fn goals_history(&self) -> Vec<Goal> {
        self.state().data.goals_history().to_vec()
    }

    /// Clone of the full state
    pub fn snapshot(&self) -> AppData {
        self.state().data.clone()
    }

    pub fn summary(&self) -> StreakSummary {
        let today = self.today();
        let state = self.state();
        let data = &state.data;
        let goal = data.goal();

        StreakSummary {
            topic: goal.map(|g| g.topic().to_string()),
            duration: goal.map(|g| g.duration()),
            start_date: goal.map(|g| g.start_date()),
            days_learned: data.days_learned(),
            target_days: goal.map(|g| g.duration().target_days()).unwrap_or(0),
            freezes_used: data.freezes_used(),
            max_freezes: data.max_freezes(),
            freezes_remaining: data.freezes_remaining(),
            is_configured: data.is_configured(),
            is_goal_completed: data.is_goal_completed(),
            archived_goals: data.goals_history().len(),
            selected_date: state.selected,
            today,
        }
    }

    // Listeners

    /// Register a callback for state changes
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StreakEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        debug!(listener = id, "Listener subscribed");
        id
    }

    /// Remove a listener. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn emit(&self, events: Vec<StreakEvent>) {
        if events.is_empty() {
            return;
        }

        // Listeners may call back into the store, so neither lock is held
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for event in &events {
            for listener in &listeners {
                listener(event);
            }
        }
    }
}

impl Drop for StreakStore {
    fn drop(&mut self) {
        debug!("Streak store closing");
    }
}

fn move_selection(state: &mut State, day: NaiveDate) -> Option<StreakEvent> {
    if state.selected == day {
        return None;
    }
    state.selected = day;
    Some(StreakEvent::SelectionChanged { day })
}

fn check_log(data: &AppData, day: NaiveDate, status: DayStatus, today: NaiveDate) -> Vec<RejectReason> {
    let mut reasons = Vec::new();

    let existing = data.status(day);
    if existing.is_logged() {
        reasons.push(RejectReason::AlreadyLogged { status: existing });
    }

    if data.is_goal_completed() {
        reasons.push(RejectReason::GoalCompleted);
    }

    if day > today {
        reasons.push(RejectReason::FutureDate { day, today });
    }

    if status == DayStatus::Freezed && data.freezes_remaining() == 0 {
        reasons.push(RejectReason::FreezesExhausted {
            used: data.freezes_used(),
            max: data.max_freezes(),
        });
    }

    reasons
}

/// Decode persisted state, treating anything unreadable as a first run
fn load_data(adapter: &dyn PersistenceAdapter) -> AppData {
    match adapter.load() {
        Ok(Some(bytes)) => match decode(&bytes) {
            Ok(data) => {
                debug!(bytes = bytes.len(), "Persisted data decoded");
                data
            }
            Err(e) => {
                warn!(error = %e, "Persisted data unreadable, starting fresh");
                AppData::empty()
            }
        },
        Ok(None) => {
            debug!("No persisted data, starting fresh");
            AppData::empty()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load persisted data, starting fresh");
            AppData::empty()
        }
    }
}
