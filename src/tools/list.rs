/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Habit, HabitId, Scheduler};
use crate::storage::KeyValueSlot;
use crate::store::HabitStore;

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    pub url: Option<String>,
    pub completion_count: u32,
    pub last_completed: Option<NaiveDate>,
    pub due_date: DateTime<Utc>,
    /// Due today or earlier
    pub is_due: bool,
    /// Interval the next completion would schedule
    pub next_interval_days: u64,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub due_count: usize,
    pub message: String,
}

fn summarize(habit: &Habit, scheduler: &Scheduler, today: NaiveDate) -> HabitSummary {
    HabitSummary {
        habit_id: habit.id,
        name: habit.name.clone(),
        url: habit.link().map(str::to_string),
        completion_count: habit.completion_count,
        last_completed: habit.last_completed(),
        due_date: habit.due_date,
        is_due: habit.due_date.date_naive() <= today,
        next_interval_days: scheduler
            .backoff_interval(habit.completion_count.saturating_add(1))
            .unwrap_or(1),
    }
}

/// List habits in insertion order
pub fn list_habits<S: KeyValueSlot>(store: &HabitStore<S>) -> ListHabitsResponse {
    let today = store.today();
    let habits: Vec<HabitSummary> = store
        .habits()
        .iter()
        .map(|habit| summarize(habit, store.scheduler(), today))
        .collect();
    let due_count = habits.iter().filter(|h| h.is_due).count();

    let message = if habits.is_empty() {
        "No habits found. Add your first habit to get started!".to_string()
    } else {
        let header = format!("📋 **Habits** ({} total, {} due)\n\n", habits.len(), due_count);
        let lines = habits
            .iter()
            .map(|h| {
                format!(
                    "{} **{}** (id {})\n   ✅ Completed: {} | 📅 Due: {}{}",
                    if h.is_due { "🔔" } else { "🎯" },
                    h.name,
                    h.habit_id,
                    h.completion_count,
                    h.due_date.format("%Y-%m-%d"),
                    h.url
                        .as_ref()
                        .map(|url| format!(" | 🔗 {}", url))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}{}", header, lines)
    };

    ListHabitsResponse {
        habits,
        due_count,
        message,
    }
}
