/// Backoff scheduling
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_backoff::*;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[test]
fn test_intervals_double() {
    let scheduler = Scheduler::default();

    assert_eq!(scheduler.backoff_interval(0), None);
    let intervals: Vec<u64> = (1..=5).filter_map(|n| scheduler.backoff_interval(n)).collect();
    assert_eq!(intervals, vec![1, 2, 4, 8, 16]);
}

#[test]
fn test_intervals_are_capped() {
    let scheduler = Scheduler {
        max_interval_days: 30,
        ..Scheduler::default()
    };

    assert_eq!(scheduler.backoff_interval(5), Some(16));
    assert_eq!(scheduler.backoff_interval(6), Some(30));
    assert_eq!(scheduler.backoff_interval(u32::MAX), Some(30));
}

#[test]
fn test_due_date_from_now() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
    let mut habit = Habit::new(HabitId(1), "Scales", "", now).unwrap();
    let scheduler = Scheduler::default();

    for (n, day) in [1, 2, 3, 4].into_iter().zip(1..) {
        habit.toggle_day(date(3, day));
        let due = scheduler.next_due_date(&habit, now);
        assert_eq!(due - now, Duration::days(1 << (n - 1)));
    }

    habit.completed_dates.clear();
    habit.completion_count = 0;
    assert_eq!(scheduler.next_due_date(&habit, now), now);
}

#[test]
fn test_due_date_from_last_completion() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
    let mut habit = Habit::new(HabitId(1), "Scales", "", now).unwrap();
    let scheduler = Scheduler::new(BackoffBase::LastCompletion);

    habit.toggle_day(date(3, 10));
    habit.toggle_day(date(3, 12));

    let due = scheduler.next_due_date(&habit, now);
    assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap());
}

#[test]
fn test_last_completion_follows_insertion_order_after_clearing() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
    let mut habit = Habit::new(HabitId(1), "Scales", "", now).unwrap();
    let scheduler = Scheduler::new(BackoffBase::LastCompletion);

    // Inserted out of calendar order: the base is the 10th, not the 12th
    habit.toggle_day(date(3, 12));
    habit.toggle_day(date(3, 10));
    assert_eq!(
        scheduler.next_due_date(&habit, now),
        Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap()
    );

    // Clearing the 12th leaves only the 10th
    habit.toggle_day(date(3, 12));
    assert_eq!(
        scheduler.next_due_date(&habit, now),
        Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
    );

    // Clearing the last inserted day falls back to the earlier insertion
    habit.toggle_day(date(3, 14));
    habit.toggle_day(date(3, 14));
    assert_eq!(
        scheduler.next_due_date(&habit, now),
        Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_many_completions_stay_representable() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
    let mut habit = Habit::new(HabitId(1), "Scales", "", now).unwrap();
    let scheduler = Scheduler::default();

    for offset in 0..40 {
        habit.toggle_day(date(1, 1) + Duration::days(offset));
    }

    let due = scheduler.next_due_date(&habit, now);
    assert_eq!(due - now, Duration::days(DEFAULT_MAX_INTERVAL_DAYS as i64));
}
