/// Due-date scheduling with exponential backoff
///
/// After every change to a habit's completed days the next due date is
/// recomputed: a habit never completed is due now, otherwise it is due
/// 2^(count - 1) days after the backoff base.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Habit;

/// Longest interval the scheduler will ever add, in days
///
/// Without a cap the doubling leaves chrono's representable range after
/// fewer than thirty completions.
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 65_536;

/// What the backoff interval is added to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffBase {
    /// The moment the toggle happens
    #[default]
    Now,
    /// Midnight UTC of the most recently inserted completion day, or now
    /// if there is none
    LastCompletion,
}

/// Computes next due dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    #[serde(default)]
    pub base: BackoffBase,
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: u32,
}

fn default_max_interval_days() -> u32 {
    DEFAULT_MAX_INTERVAL_DAYS
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            base: BackoffBase::Now,
            max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
        }
    }
}

impl Scheduler {
    pub fn new(base: BackoffBase) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Days added for a given completion count, `None` when never completed
    ///
    /// Doubles with every completion (1, 2, 4, 8, ...) up to the cap.
    pub fn backoff_interval(&self, completion_count: u32) -> Option<u64> {
        if completion_count == 0 {
            return None;
        }
        let cap = u64::from(self.max_interval_days.max(1));
        let days = 1u64
            .checked_shl(completion_count - 1)
            .unwrap_or(u64::MAX);
        Some(days.min(cap))
    }

    /// Next due date for `habit` given its current completion state
    pub fn next_due_date(&self, habit: &Habit, now: DateTime<Utc>) -> DateTime<Utc> {
        let Some(days) = self.backoff_interval(habit.completion_count) else {
            return now;
        };

        let base = match self.base {
            BackoffBase::Now => now,
            BackoffBase::LastCompletion => habit
                .last_completed()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|midnight| Utc.from_utc_datetime(&midnight))
                .unwrap_or(now),
        };

        // days <= u32::MAX, so the duration itself never overflows
        base.checked_add_signed(Duration::days(days as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
