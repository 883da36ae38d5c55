/// Domain module containing the habit state engine's core types and rules
///
/// This module defines the Habit entity, the due-date scheduler, the date
/// window generator and the per-day grid projection. Everything in here is
/// pure: no I/O, and time always comes in as a parameter or through a Clock.

pub mod habit;
pub mod schedule;
pub mod window;
pub mod grid;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use schedule::*;
pub use window::*;
pub use grid::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid navigation: {0}")]
    InvalidNavigation(String),

    #[error("No free habit id left")]
    IdsExhausted,
}

impl DomainError {
    /// True for input the caller should reject and re-prompt for
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidHabitName(_)
                | DomainError::InvalidDate(_)
                | DomainError::InvalidNavigation(_)
        )
    }
}
