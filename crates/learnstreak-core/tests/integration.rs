//! Integration tests for learnstreak-core
//!
//! These tests drive the streak store end to end over real adapters.

use chrono::NaiveDate;
use learnstreak_api::{decode, DayStatus, LearningDuration, StreakEvent};
use learnstreak_config::{Settings, StorageBackend};
use learnstreak_core::{open_default_store, open_store, LogDecision, RejectReason, StreakStore};
use learnstreak_store::{MemoryAdapter, PersistenceAdapter, SqliteAdapter};
use learnstreak_util::{FixedClock, DEFAULT_BLOB_KEY};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const SHORT: Duration = Duration::from_millis(40);
const LONG: Duration = Duration::from_secs(60);

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn open(adapter: &Arc<MemoryAdapter>, today: NaiveDate, debounce: Duration) -> StreakStore {
    let clock = Arc::new(FixedClock::at_day(today));
    StreakStore::with_clock(adapter.clone(), clock, debounce).unwrap()
}

#[test]
fn test_week_goal_scenario() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);

    store.set_goal("Rust", LearningDuration::Week);
    assert_eq!(store.freezes_remaining(), 2);

    assert!(store.log_freezed(day(6, 1)).is_logged());
    assert!(store.log_freezed(day(6, 2)).is_logged());
    assert_eq!(store.freezes_remaining(), 0);

    let third = store.log_freezed(day(6, 3));
    assert_eq!(
        third,
        LogDecision::Rejected {
            reasons: vec![RejectReason::FreezesExhausted { used: 2, max: 2 }]
        }
    );
    assert_eq!(store.status(day(6, 3)), DayStatus::Unlogged);
    assert_eq!(store.freezes_used(), 2);

    for d in 4..=8 {
        assert!(store.log_learned(day(6, d)).is_logged());
    }
    assert_eq!(store.days_learned(), 5);
    assert!(!store.is_goal_completed());

    store.log_learned(day(6, 9));
    store.log_learned(day(6, 10));
    assert_eq!(store.days_learned(), 7);
    assert!(store.is_goal_completed());

    // Completed goals accept nothing further
    assert!(!store.can_log_learned(day(6, 11)));
    assert!(!store.can_log_freezed(day(6, 11)));

    // Repeating starts over
    store.repeat_goal().unwrap();
    assert!(!store.is_goal_completed());
    assert_eq!(store.days_learned(), 0);
    assert_eq!(store.freezes_remaining(), 2);
}

#[test]
fn test_new_goal_archives_previous() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);

    store.set_goal("Rust", LearningDuration::Month);
    store.log_learned(day(6, 19));
    store.log_freezed(day(6, 18));

    store.set_goal("Go", LearningDuration::Week);

    let history = store.goals_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].topic(), "Rust");
    assert_eq!(history[0].duration(), LearningDuration::Month);
    assert_eq!(store.current_topic().as_deref(), Some("Go"));
    assert!(store.snapshot().streak_history().is_empty());
    assert_eq!(store.freezes_used(), 0);
}

#[test]
fn test_new_goal_after_completion_starts_incomplete() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);

    store.set_goal("Rust", LearningDuration::Week);
    for d in 14..=20 {
        assert!(store.log_learned(day(6, d)).is_logged());
    }
    assert!(store.is_goal_completed());

    store.set_goal("Go", LearningDuration::Month);

    assert!(!store.is_goal_completed());
    assert_eq!(store.days_learned(), 0);
    assert_eq!(store.goals_history().len(), 1);
    assert_eq!(store.goals_history()[0].topic(), "Rust");
    assert!(store.can_log_learned(day(6, 20)));
    assert!(!store.summary().is_goal_completed);
}

#[test]
fn test_future_day_is_rejected() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);
    store.set_goal("Rust", LearningDuration::Month);

    assert!(!store.log_learned(day(6, 21)).is_logged());
    assert!(!store.log_freezed(day(6, 21)).is_logged());
    assert!(store.snapshot().streak_history().is_empty());
}

#[test]
fn test_state_survives_reopen() {
    let adapter = Arc::new(MemoryAdapter::new());

    let before = {
        let store = open(&adapter, day(6, 20), LONG);
        store.set_goal("Swift", LearningDuration::Week);
        store.set_goal("Rust", LearningDuration::Month);
        store.log_learned(day(6, 18));
        store.log_freezed(day(6, 19));
        store.log_learned(day(6, 20));
        store.snapshot()
    };

    // Dropping the store wrote the pending snapshot
    let stored = decode(&adapter.bytes().unwrap()).unwrap();
    assert_eq!(stored, before);

    let store = open(&adapter, day(6, 21), LONG);
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.days_learned(), 2);
    assert_eq!(store.freezes_used(), 1);
    assert_eq!(store.goals_history().len(), 1);
}

#[test]
fn test_writes_are_debounced() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), SHORT);

    store.set_goal("Rust", LearningDuration::Month);
    for d in 10..=15 {
        store.log_learned(day(6, d));
    }
    assert_eq!(adapter.save_count(), 0);

    thread::sleep(SHORT * 8);
    assert_eq!(adapter.save_count(), 1);

    let stored = decode(&adapter.bytes().unwrap()).unwrap();
    assert_eq!(stored.days_learned(), 6);

    // Nothing new to write
    store.flush().unwrap();
    assert_eq!(adapter.save_count(), 1);
}

#[test]
fn test_clear_all_is_immediate() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), SHORT);

    store.set_goal("Rust", LearningDuration::Month);
    store.flush().unwrap();
    assert!(adapter.bytes().is_some());

    // A pending write must not resurrect cleared data
    store.log_learned(day(6, 20));
    store.clear_all().unwrap();
    assert!(adapter.bytes().is_none());

    thread::sleep(SHORT * 5);
    assert!(adapter.bytes().is_none());
    assert!(!store.is_configured());
    assert_eq!(store.freezes_remaining(), 0);
}

#[test]
fn test_unreadable_data_starts_fresh() {
    let garbage = Arc::new(MemoryAdapter::with_bytes(b"{not json".to_vec()));
    let store = open(&garbage, day(6, 20), LONG);
    assert!(!store.is_configured());
    assert_eq!(store.days_learned(), 0);

    let failing = Arc::new(MemoryAdapter::new());
    failing.set_fail_load(true);
    let store = open(&failing, day(6, 20), LONG);
    assert!(!store.is_configured());
}

#[test]
fn test_save_failure_does_not_reach_callers() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), SHORT);
    adapter.set_fail_save(true);

    store.set_goal("Rust", LearningDuration::Week);
    assert!(store.log_learned(day(6, 20)).is_logged());
    thread::sleep(SHORT * 5);

    assert!(adapter.bytes().is_none());
    assert_eq!(store.days_learned(), 1);
    assert!(store.flush().is_err());

    // Storage comes back; the next flush reconciles
    adapter.set_fail_save(false);
    store.flush().unwrap();
    let stored = decode(&adapter.bytes().unwrap()).unwrap();
    assert_eq!(stored, store.snapshot());
}

#[test]
fn test_listeners_receive_events() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);

    let seen: Arc<Mutex<Vec<StreakEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let goal = store.set_goal("Rust", LearningDuration::Week);
    store.log_freezed(day(6, 19));
    store.log_learned(day(6, 19)); // rejected, no event
    store.select_date(day(6, 1));
    store.clear_all().unwrap();

    {
        let events = seen.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                StreakEvent::GoalSet {
                    goal,
                    archived: None
                },
                StreakEvent::DayLogged {
                    day: day(6, 19),
                    status: DayStatus::Freezed,
                    days_learned: 0,
                    freezes_used: 1,
                },
                StreakEvent::SelectionChanged { day: day(6, 1) },
                StreakEvent::Cleared,
                StreakEvent::SelectionChanged { day: day(6, 20) },
            ]
        );
    }

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.set_goal("Go", LearningDuration::Week);
    assert_eq!(seen.lock().unwrap().len(), 5);
}

#[test]
fn test_goal_completed_event_fires_once() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);

    let completions = Arc::new(Mutex::new(0u32));
    let counter = completions.clone();
    store.subscribe(move |event| {
        if matches!(event, StreakEvent::GoalCompleted { .. }) {
            *counter.lock().unwrap() += 1;
        }
    });

    store.set_goal("Rust", LearningDuration::Week);
    for d in 10..=20 {
        store.log_learned(day(6, d));
    }

    assert_eq!(store.days_learned(), 7);
    assert_eq!(*completions.lock().unwrap(), 1);
}

#[test]
fn test_listener_may_query_store() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = Arc::new(open(&adapter, day(6, 20), LONG));

    let learned = Arc::new(Mutex::new(Vec::new()));
    let sink = learned.clone();
    let weak = Arc::downgrade(&store);
    store.subscribe(move |event| {
        if let (StreakEvent::DayLogged { .. }, Some(store)) = (event, weak.upgrade()) {
            sink.lock().unwrap().push(store.days_learned());
        }
    });

    store.set_goal("Rust", LearningDuration::Month);
    store.log_learned(day(6, 19));
    store.log_learned(day(6, 20));

    assert_eq!(*learned.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_concurrent_freezes_respect_budget() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = Arc::new(open(&adapter, day(6, 20), LONG));
    store.set_goal("Rust", LearningDuration::Week);

    let handles: Vec<_> = (1..=10)
        .map(|d| {
            let store = store.clone();
            thread::spawn(move || store.log_freezed(day(6, d)).is_logged())
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 2);
    assert_eq!(store.freezes_used(), 2);
}

#[test]
fn test_reload_rereads_storage() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = open(&adapter, day(6, 20), LONG);
    store.set_goal("Rust", LearningDuration::Month);
    store.log_learned(day(6, 20));
    store.select_date(day(6, 2));

    store.reload().unwrap();
    assert_eq!(store.current_topic().as_deref(), Some("Rust"));
    assert_eq!(store.days_learned(), 1);
    assert_eq!(store.selected_date(), day(6, 20));

    // External reset is picked up
    adapter.clear().unwrap();
    store.reload().unwrap();
    assert!(!store.is_configured());
}

#[test]
fn test_file_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("learnstreak.json");
    let settings = Settings {
        storage: StorageBackend::File { path: path.clone() },
        debounce: LONG,
        log_level: "info".into(),
    };

    {
        let store = open_store(&settings).unwrap();
        store.set_goal("Rust", LearningDuration::Year);
        store.log_learned(store.today());
    }
    assert!(path.exists());

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["goal"]["topic"], "Rust");
    assert_eq!(raw["goal"]["duration"], "Year");

    let store = open_store(&settings).unwrap();
    assert_eq!(store.days_learned(), 1);

    store.clear_all().unwrap();
    assert!(!path.exists());
}

#[test]
fn test_sqlite_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learnstreak.db");
    let settings = Settings {
        storage: StorageBackend::Sqlite {
            path: path.clone(),
            key: DEFAULT_BLOB_KEY.into(),
        },
        debounce: LONG,
        log_level: "info".into(),
    };

    {
        let store = open_store(&settings).unwrap();
        store.set_goal("Go", LearningDuration::Week);
        store.flush().unwrap();
    }

    let adapter = SqliteAdapter::open(&path, DEFAULT_BLOB_KEY).unwrap();
    let stored = decode(&adapter.load().unwrap().unwrap()).unwrap();
    assert_eq!(stored.goal().unwrap().topic(), "Go");

    let store = open_store(&settings).unwrap();
    assert_eq!(store.duration(), Some(LearningDuration::Week));
}

#[test]
fn test_memory_backend_from_settings() {
    let store = open_store(&Settings::in_memory(SHORT)).unwrap();
    assert!(!store.is_configured());
    store.set_goal("Rust", LearningDuration::Week);
    assert!(store.is_configured());
}

#[test]
fn test_default_store_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config").join("learnstreak");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "config_version = 1\n[storage]\nbackend = \"sqlite\"\n",
    )
    .unwrap();

    // Only this test touches these variables
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir.path().join("config"));
        std::env::set_var("LEARNSTREAK_DATA_DIR", dir.path().join("data"));
    }

    {
        let store = open_default_store().unwrap();
        store.set_goal("Rust", LearningDuration::Month);
    }

    assert!(dir.path().join("data").join("learnstreak.db").exists());
    let store = open_default_store().unwrap();
    assert_eq!(store.current_topic().as_deref(), Some("Rust"));
}
