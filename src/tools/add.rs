/// Tool for creating new habits
///
/// This module implements the habit_add MCP tool.

use serde::{Deserialize, Serialize};

use crate::domain::HabitId;
use crate::storage::KeyValueSlot;
use crate::store::{HabitStore, StoreError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct AddHabitParams {
    pub name: String,
    pub url: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct AddHabitResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub message: String,
}

/// Create a new habit in the provided store
pub fn add_habit<S: KeyValueSlot>(
    store: &mut HabitStore<S>,
    params: AddHabitParams,
) -> Result<AddHabitResponse, StoreError> {
    let habit_id = store.add_habit(&params.name, params.url.as_deref())?;

    let message = match store.get(habit_id) {
        Some(habit) => match habit.link() {
            Some(link) => format!("✅ Added habit '{}' ({}), due now", habit.name, link),
            None => format!("✅ Added habit '{}', due now", habit.name),
        },
        None => format!("✅ Added habit {}", habit_id),
    };

    Ok(AddHabitResponse {
        success: true,
        habit_id,
        message,
    })
}
