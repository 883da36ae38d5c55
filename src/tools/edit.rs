/// Tool for editing existing habits
///
/// This module implements the habit_edit MCP tool to rename a habit or
/// change its link. Completion history and due date are never touched.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId};
use crate::storage::KeyValueSlot;
use crate::store::{HabitStore, StoreError};

/// Parameters for editing a habit
#[derive(Debug, Deserialize)]
pub struct EditHabitParams {
    pub habit_id: HabitId,
    pub name: String,
    /// `None` keeps the current link, an empty string removes it
    pub url: Option<String>,
}

/// Response from editing a habit
#[derive(Debug, Serialize)]
pub struct EditHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Edit a habit in the provided store
pub fn edit_habit<S: KeyValueSlot>(
    store: &mut HabitStore<S>,
    params: EditHabitParams,
) -> Result<EditHabitResponse, StoreError> {
    let current_url = store
        .get(params.habit_id)
        .map(|habit| habit.url.clone())
        .ok_or(DomainError::HabitNotFound {
            habit_id: params.habit_id,
        })?;
    let url = params.url.unwrap_or(current_url);

    store.edit_habit(params.habit_id, &params.name, Some(&url))?;

    let name = store
        .get(params.habit_id)
        .map(|habit| habit.name.clone())
        .unwrap_or_default();

    Ok(EditHabitResponse {
        success: true,
        message: format!("✅ Updated habit '{}'", name),
    })
}
