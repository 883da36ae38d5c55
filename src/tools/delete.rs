/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deleting an id that
/// does not exist succeeds without changing anything.

use serde::{Deserialize, Serialize};

use crate::domain::HabitId;
use crate::storage::KeyValueSlot;
use crate::store::{HabitStore, StoreError};

#[derive(Debug, Deserialize)]
pub struct DeleteHabitParams {
    pub habit_id: HabitId,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub deleted: bool,
    pub message: String,
}

pub fn delete_habit<S: KeyValueSlot>(
    store: &mut HabitStore<S>,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, StoreError> {
    let name = store.get(params.habit_id).map(|habit| habit.name.clone());
    store.delete_habit(params.habit_id)?;

    let message = match &name {
        Some(name) => format!("🗑️ Deleted habit '{}'", name),
        None => format!("No habit with id {}; nothing to delete", params.habit_id),
    };

    Ok(DeleteHabitResponse {
        success: true,
        deleted: name.is_some(),
        message,
    })
}
