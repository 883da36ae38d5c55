/// The store over each slot kind, across reopen
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_backoff::*;
use tempfile::tempdir;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
}

fn open<S: KeyValueSlot>(slot: S, clock: &FixedClock) -> HabitStore<S> {
    HabitStore::open_with_clock(Persistence::new(slot), Scheduler::default(), Box::new(clock.clone()))
}

/// Run a short session against `slot` and return what was written
fn exercise<S: KeyValueSlot>(slot: S) -> Vec<Habit> {
    let clock = clock();
    let mut store = open(slot, &clock);

    let read = store.add_habit("Read", Some("books.example")).unwrap();
    clock.advance(Duration::milliseconds(5));
    let run = store.add_habit("Run", None).unwrap();
    store.toggle_completion(read, date(3, 14)).unwrap();
    store.toggle_completion(read, date(3, 15)).unwrap();
    store.toggle_completion(run, date(3, 15)).unwrap();
    store.toggle_completion(run, date(3, 15)).unwrap();

    store.habits().to_vec()
}

fn assert_session(habits: &[Habit]) {
    assert_eq!(habits.len(), 2);
    assert_eq!(habits[0].name, "Read");
    assert_eq!(habits[0].url, "http://books.example");
    assert_eq!(habits[0].completion_count, 2);
    assert_eq!(habits[0].due_date, Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap());
    assert_eq!(habits[1].name, "Run");
    assert_eq!(habits[1].completion_count, 0);
    assert!(habits[1].completed_dates.is_empty());
}

#[test]
fn test_sqlite_slot_survives_reopen() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("habits.db");

    let written = exercise(SqliteSlot::new(db_path.clone()).unwrap());
    let reopened = open(SqliteSlot::new(db_path).unwrap(), &clock());

    assert_eq!(reopened.habits(), written.as_slice());
    assert_session(reopened.habits());
}

#[test]
fn test_file_slot_survives_reopen() {
    let temp_dir = tempdir().unwrap();

    let written = exercise(FileSlot::new(temp_dir.path()));
    let reopened = open(FileSlot::new(temp_dir.path()), &clock());

    assert_eq!(reopened.habits(), written.as_slice());
    assert_session(reopened.habits());
    assert!(temp_dir.path().join("habits.json").exists());
}

#[test]
fn test_memory_slot_round_trip() {
    let slot = MemorySlot::new();

    let written = exercise(&slot);
    let reopened = open(&slot, &clock());

    assert_eq!(reopened.habits(), written.as_slice());
    // Two adds and four toggles
    assert_eq!(slot.write_count(), 6);
}

#[test]
fn test_new_ids_never_collide_with_loaded_ones() {
    let slot = MemorySlot::new();
    let clock = clock();

    let first = open(&slot, &clock).add_habit("Read", None).unwrap();
    // Same instant, fresh store: the generator must still move past the loaded id
    let second = open(&slot, &clock).add_habit("Run", None).unwrap();

    assert!(second > first);
    assert_eq!(open(&slot, &clock).len(), 2);
}

#[test]
fn test_unreadable_snapshots_start_empty() {
    for payload in ["not json", "{\"version\": 99, \"habits\": []}", "[{\"id\": 1}]"] {
        let slot = MemorySlot::new();
        slot.insert(HABITS_KEY, payload);

        let mut store = open(&slot, &clock());
        assert!(store.is_empty(), "{}", payload);

        store.add_habit("Fresh", None).unwrap();
        assert_eq!(open(&slot, &clock()).len(), 1);
    }
}

#[test]
fn test_legacy_array_is_read_and_repaired() {
    let slot = MemorySlot::new();
    slot.insert(
        HABITS_KEY,
        r#"[
            {"id": 1, "name": "Read", "url": "books.example", "completedDates": ["2024-03-01", "2024-03-01", "2024-03-02"],
             "dueDate": "2024-03-04T00:00:00Z", "completionCount": 7},
            {"id": 1, "name": "Duplicate", "dueDate": "2024-03-04T00:00:00Z"},
            {"id": 2, "name": "  ", "dueDate": "2024-03-04T00:00:00Z"}
        ]"#,
    );

    let store = open(&slot, &clock());

    assert_eq!(store.len(), 1);
    let habit = &store.habits()[0];
    assert_eq!(habit.completed_dates, vec![date(3, 1), date(3, 2)]);
    assert_eq!(habit.completion_count, 2);
    assert_eq!(habit.url, "http://books.example");
}

#[test]
fn test_failed_write_keeps_memory_and_reports() {
    let slot = MemorySlot::new();
    let clock = clock();
    let mut store = open(&slot, &clock);
    let id = store.add_habit("Read", None).unwrap();

    slot.set_simulate_write_error(true);
    let result = store.toggle_completion(id, date(3, 15));

    assert!(matches!(result, Err(StoreError::Persistence(_))));
    assert!(store.is_completed_on(id, date(3, 15)).unwrap());

    slot.set_simulate_write_error(false);
    let reopened = open(&slot, &clock);
    assert!(!reopened.is_completed_on(id, date(3, 15)).unwrap());
}

#[test]
fn test_delete_is_idempotent() {
    let slot = MemorySlot::new();
    let mut store = open(&slot, &clock());
    let id = store.add_habit("Read", None).unwrap();

    store.delete_habit(id).unwrap();
    store.delete_habit(id).unwrap();
    store.delete_habit(HabitId(42)).unwrap();

    assert!(store.is_empty());
    assert!(open(&slot, &clock()).is_empty());
}

#[test]
fn test_missing_habit_is_reported() {
    let mut store = open(MemorySlot::new(), &clock());

    let toggle = store.toggle_completion(HabitId(9), date(3, 15));
    let edit = store.edit_habit(HabitId(9), "Name", None);

    assert!(toggle.unwrap_err().is_not_found());
    assert!(edit.unwrap_err().is_not_found());
}
