/// The habit store: sole owner and writer of the habit collection
///
/// Every mutator follows the same sequence: validate, change the in-memory
/// collection, recompute whatever derives from it, then write the whole
/// collection through the persistence adapter. The save therefore always
/// observes the change that triggered it.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{
    CalendarDay, Clock, DayToggle, DomainError, Habit, HabitId, IdGenerator, Scheduler, SystemClock,
};
use crate::storage::{KeyValueSlot, Persistence, StorageError};

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The change is applied in memory but could not be written out
    #[error("Failed to persist habits: {0}")]
    Persistence(#[from] StorageError),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Domain(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::HabitNotFound { .. }))
    }
}

pub struct HabitStore<S: KeyValueSlot> {
    habits: Vec<Habit>,
    persistence: Persistence<S>,
    scheduler: Scheduler,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
}

impl<S: KeyValueSlot> HabitStore<S> {
    /// Load the stored collection and start accepting mutations
    pub fn open(persistence: Persistence<S>, scheduler: Scheduler) -> Self {
        Self::open_with_clock(persistence, scheduler, Box::new(SystemClock))
    }

    pub fn open_with_clock(
        persistence: Persistence<S>,
        scheduler: Scheduler,
        clock: Box<dyn Clock>,
    ) -> Self {
        let habits = persistence.load();
        let ids = IdGenerator::seeded(habits.iter().map(|h| h.id));
        info!("Habit store opened with {} habits", habits.len());

        Self {
            habits,
            persistence,
            scheduler,
            clock,
            ids,
        }
    }

    /// Create a habit and return its id
    ///
    /// If the save fails the habit is still added, as the last entry of
    /// `habits()`, and `StoreError::Persistence` is returned.
    pub fn add_habit(&mut self, name: &str, url: Option<&str>) -> Result<HabitId, StoreError> {
        let now = self.clock.now();
        // Validate before drawing an id so a rejected name leaves no trace
        crate::domain::normalize_name(name)?;
        let id = self
            .ids
            .next(now, self.habits.iter().map(|habit| habit.id))
            .ok_or(DomainError::IdsExhausted)?;
        let habit = Habit::new(id, name, url.unwrap_or(""), now)?;

        debug!("Added habit '{}' ({})", habit.name, id);
        self.habits.push(habit);
        self.persist()?;
        Ok(id)
    }

    /// Replace a habit's name and link
    pub fn edit_habit(&mut self, id: HabitId, name: &str, url: Option<&str>) -> Result<(), StoreError> {
        let habit = self.find_mut(id)?;
        habit.rename(name, url.unwrap_or(""))?;

        debug!("Edited habit '{}' ({})", habit.name, id);
        self.persist()
    }

    /// Remove a habit; removing an unknown id is not an error
    pub fn delete_habit(&mut self, id: HabitId) -> Result<(), StoreError> {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);

        if self.habits.len() == before {
            debug!("Delete of unknown habit {} ignored", id);
        } else {
            debug!("Deleted habit {}", id);
        }
        self.persist()
    }

    /// Flip `day` between done and not done, then reschedule the habit
    pub fn toggle_completion(&mut self, id: HabitId, day: impl CalendarDay) -> Result<DayToggle, StoreError> {
        let day = day.calendar_day();
        let now = self.clock.now();
        let scheduler = self.scheduler;

        let habit = self.find_mut(id)?;
        let toggle = habit.toggle_day(day);
        habit.due_date = scheduler.next_due_date(habit, now);

        debug!(
            "Toggled {} on habit '{}' ({:?}); {} completions, due {}",
            day, habit.name, toggle, habit.completion_count, habit.due_date
        );
        self.persist()?;
        Ok(toggle)
    }

    /// All habits in insertion order
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn is_completed_on(&self, id: HabitId, day: impl CalendarDay) -> Result<bool, DomainError> {
        self.get(id)
            .map(|habit| habit.is_completed_on(day.calendar_day()))
            .ok_or(DomainError::HabitNotFound { habit_id: id })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn find_mut(&mut self, id: HabitId) -> Result<&mut Habit, DomainError> {
        self.habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(DomainError::HabitNotFound { habit_id: id })
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.persistence.save(&self.habits)?;
        Ok(())
    }
}
