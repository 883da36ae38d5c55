/// Core types used throughout the domain layer
///
/// This module defines the habit identifier and its generator, the
/// calendar-day normalization used by completion toggles, and the Clock
/// abstraction the store reads "now" from.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// Ids are integers derived from the creation time in milliseconds, which
/// keeps them compatible with snapshots written by earlier versions of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Raw integer value
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for HabitId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Generates collision-free habit ids
///
/// The candidate id is the current time in milliseconds. If that is not
/// greater than the last id handed out (two habits in the same millisecond,
/// a clock step backwards, or a loaded snapshot holding larger ids), the
/// generator bumps past it. Ids increase until they reach `i64::MAX`.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that will never reissue any of `existing`
    pub fn seeded<I: IntoIterator<Item = HabitId>>(existing: I) -> Self {
        Self {
            last: existing.into_iter().map(HabitId::value).max(),
        }
    }

    /// Issue the next id for a habit created at `now`
    ///
    /// `in_use` is only consulted once the ids have run up against
    /// `i64::MAX`; the highest id not in it is issued instead. `None` means
    /// every id is taken.
    pub fn next<I>(&mut self, now: DateTime<Utc>, in_use: I) -> Option<HabitId>
    where
        I: IntoIterator<Item = HabitId>,
    {
        let candidate = now.timestamp_millis();
        let id = match self.last {
            Some(last) if candidate <= last => match last.checked_add(1) {
                Some(id) => id,
                None => highest_free_id(in_use)?,
            },
            _ => candidate,
        };
        self.last = Some(self.last.map_or(id, |last| last.max(id)));
        Some(HabitId(id))
    }
}

fn highest_free_id<I: IntoIterator<Item = HabitId>>(in_use: I) -> Option<i64> {
    let mut taken: Vec<i64> = in_use.into_iter().map(HabitId::value).collect();
    taken.sort_unstable_by(|a, b| b.cmp(a));
    taken.dedup();

    let mut candidate = i64::MAX;
    for id in taken {
        if id < candidate {
            break;
        }
        candidate = candidate.checked_sub(1)?;
    }
    Some(candidate)
}

/// Anything that can be reduced to a calendar day
///
/// Completion toggles discard the time of day; a timestamp contributes the
/// calendar date in its own time zone.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Parse a day from either `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_day(input: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.calendar_day())
        .map_err(|_| {
            DomainError::InvalidDate(format!(
                "'{}' is neither YYYY-MM-DD nor an RFC 3339 timestamp",
                input
            ))
        })
}

/// Source of the current time for the store and scheduler
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the store.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = guard.checked_add_signed(by).unwrap_or(*guard);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
