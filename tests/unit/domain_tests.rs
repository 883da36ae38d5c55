/// Habit, window and grid rules
use chrono::{NaiveDate, TimeZone, Utc};
use habit_backoff::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn habit(name: &str) -> Habit {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
    Habit::new(HabitId(1), name, "", now).unwrap()
}

#[test]
fn test_new_habit_is_due_immediately() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
    let habit = Habit::new(HabitId(7), "  Read  ", "example.com", now).unwrap();

    assert_eq!(habit.name, "Read");
    assert_eq!(habit.url, "http://example.com");
    assert_eq!(habit.due_date, now);
    assert_eq!(habit.completion_count, 0);
    assert!(habit.completed_dates.is_empty());
}

#[test]
fn test_blank_names_are_rejected() {
    let now = Utc::now();
    for name in ["", "   ", "\t\n"] {
        let result = Habit::new(HabitId(1), name, "", now);
        assert!(matches!(result, Err(DomainError::InvalidHabitName(_))), "{:?}", name);
    }
}

#[test]
fn test_url_normalization() {
    assert_eq!(normalize_url(""), "");
    assert_eq!(normalize_url("   "), "");
    assert_eq!(normalize_url("example.com"), "http://example.com");
    assert_eq!(normalize_url(" https://example.com "), "https://example.com");
    assert_eq!(normalize_url("ftp://files.example"), "ftp://files.example");
    assert_eq!(normalize_url("git+ssh://host/repo"), "git+ssh://host/repo");
}

#[test]
fn test_toggle_keeps_count_in_step_with_days() {
    let mut habit = habit("Stretch");
    let days = [date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 1), date(2024, 3, 5)];

    for day in days {
        habit.toggle_day(day);
        assert_eq!(habit.completion_count as usize, habit.completed_dates.len());
    }

    assert!(!habit.is_completed_on(date(2024, 3, 1)));
    assert!(habit.is_completed_on(date(2024, 3, 2)));
    assert!(habit.is_completed_on(date(2024, 3, 5)));
}

#[test]
fn test_toggle_twice_restores_days() {
    let mut habit = habit("Stretch");
    habit.toggle_day(date(2024, 3, 2));
    let before = habit.completed_dates.clone();

    assert_eq!(habit.toggle_day(date(2024, 3, 9)), DayToggle::Completed);
    assert_eq!(habit.toggle_day(date(2024, 3, 9)), DayToggle::Cleared);

    assert_eq!(habit.completed_dates, before);
}

#[test]
fn test_calendar_day_ignores_time_of_day() {
    let late = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
    assert_eq!(late.calendar_day(), date(2024, 3, 15));
    assert_eq!(late.naive_utc().calendar_day(), date(2024, 3, 15));
    assert_eq!(parse_day("2024-03-15").unwrap(), date(2024, 3, 15));
    assert!(parse_day("15/03/2024").is_err());
}

#[test]
fn test_window_around_mid_march() {
    let dates = window(date(2024, 3, 15), 3, 11);

    assert_eq!(dates.len(), 14);
    assert_eq!(dates.first(), Some(&date(2024, 3, 12)));
    assert_eq!(dates.last(), Some(&date(2024, 3, 25)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_window_crosses_year_boundary() {
    let dates = window(date(2023, 12, 30), 3, 11);
    assert_eq!(dates[0], date(2023, 12, 27));
    assert_eq!(dates[13], date(2024, 1, 9));
}

#[test]
fn test_navigation_shifts_by_step() {
    let today = date(2024, 3, 15);
    let anchor = date(2024, 6, 1);

    let forward = navigate(anchor, Navigation::Forward, 7, today);
    assert_eq!(forward, date(2024, 6, 8));
    assert_eq!(window(forward, 3, 11)[0], window(anchor, 3, 11)[7]);

    assert_eq!(navigate(anchor, Navigation::Back, 7, today), date(2024, 5, 25));
    assert_eq!(navigate(anchor, Navigation::Today, 7, today), today);
    assert_eq!("prev".parse::<Navigation>().unwrap(), Navigation::Back);
    assert!("sideways".parse::<Navigation>().is_err());
}

#[test]
fn test_grid_marks_done_and_due_days() {
    let mut habit = habit("Scales");
    habit.toggle_day(date(2024, 3, 13));
    habit.due_date = Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap();

    let dates = window(date(2024, 3, 15), 3, 11);
    let row = habit_row(&habit, &dates);

    assert_eq!(row.cells.len(), dates.len());
    assert!(row.cells[1].completed);
    assert_eq!(row.cells.iter().filter(|c| c.completed).count(), 1);
    assert!(row.cells[4].due);
    assert_eq!(row.cells.iter().filter(|c| c.due).count(), 1);

    let headers = day_headers(&dates, date(2024, 3, 15));
    assert!(headers[3].is_today);
    assert!(headers[0].starts_month);
    assert!(!headers[1].starts_month);
}
