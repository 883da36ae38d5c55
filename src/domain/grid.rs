/// Per-day view of habits over a date window
///
/// For every habit and every visible day this answers the two questions a
/// display needs: was the habit done that day, and is that the day it is due.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{Habit, HabitId};

/// State of one habit on one visible day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub completed: bool,
    pub due: bool,
}

/// One habit across the whole window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitRow {
    pub habit_id: HabitId,
    pub name: String,
    pub cells: Vec<DayCell>,
}

/// Column header for one visible day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayHeader {
    pub date: NaiveDate,
    /// First column, or the first of a month
    pub starts_month: bool,
    pub is_today: bool,
}

pub fn habit_row(habit: &Habit, dates: &[NaiveDate]) -> HabitRow {
    HabitRow {
        habit_id: habit.id,
        name: habit.name.clone(),
        cells: dates
            .iter()
            .map(|date| DayCell {
                date: *date,
                completed: habit.is_completed_on(*date),
                due: habit.is_due_on(*date),
            })
            .collect(),
    }
}

pub fn day_grid(habits: &[Habit], dates: &[NaiveDate]) -> Vec<HabitRow> {
    habits.iter().map(|habit| habit_row(habit, dates)).collect()
}

pub fn day_headers(dates: &[NaiveDate], today: NaiveDate) -> Vec<DayHeader> {
    dates
        .iter()
        .enumerate()
        .map(|(index, date)| DayHeader {
            date: *date,
            starts_month: index == 0 || date.day() == 1,
            is_today: *date == today,
        })
        .collect()
}
