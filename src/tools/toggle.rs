/// Tool for marking a habit done or not done on a day
///
/// This module implements the habit_toggle MCP tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{parse_day, DayToggle, DomainError, HabitId};
use crate::storage::KeyValueSlot;
use crate::store::{HabitStore, StoreError};

/// Parameters for toggling a day
#[derive(Debug, Deserialize)]
pub struct ToggleHabitParams {
    pub habit_id: HabitId,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp; defaults to today
    pub date: Option<String>,
}

/// Response from toggling a day
#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub success: bool,
    pub toggle: DayToggle,
    pub completion_count: u32,
    pub due_date: DateTime<Utc>,
    pub message: String,
}

pub fn toggle_habit<S: KeyValueSlot>(
    store: &mut HabitStore<S>,
    params: ToggleHabitParams,
) -> Result<ToggleHabitResponse, StoreError> {
    let day = match params.date.as_deref() {
        Some(date) => parse_day(date)?,
        None => store.today(),
    };

    let toggle = store.toggle_completion(params.habit_id, day)?;
    let habit = store.get(params.habit_id).ok_or(DomainError::HabitNotFound {
        habit_id: params.habit_id,
    })?;
    let interval = store.scheduler().backoff_interval(habit.completion_count);

    let action = match toggle {
        DayToggle::Completed => format!("✅ Marked '{}' done on {}", habit.name, day),
        DayToggle::Cleared => format!("↩️ Cleared '{}' on {}", habit.name, day),
    };
    let next = match interval {
        Some(days) => format!(
            "Next due {} (in {} day{})",
            habit.due_date.format("%Y-%m-%d"),
            days,
            if days == 1 { "" } else { "s" }
        ),
        None => "Due now".to_string(),
    };

    Ok(ToggleHabitResponse {
        success: true,
        toggle,
        completion_count: habit.completion_count,
        due_date: habit.due_date,
        message: format!("{}. {}", action, next),
    })
}
