/// Habit entity and related functionality
///
/// This module defines the Habit struct that represents one tracked recurring
/// item, together with the name/url normalization rules applied on every write
/// and the completion toggle that keeps the count and the day set in lockstep.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId};

/// A habit the user completes on some days and is scheduled to repeat
///
/// Field names serialize in camelCase so the persisted layout matches the
/// snapshot format of earlier versions of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name, never empty, trimmed
    pub name: String,
    /// Optional link; empty when the habit has none
    #[serde(default)]
    pub url: String,
    /// Days marked done, in insertion order, without duplicates
    #[serde(default)]
    pub completed_dates: Vec<NaiveDate>,
    /// When the habit is next due
    pub due_date: DateTime<Utc>,
    /// Always equal to `completed_dates.len()`
    #[serde(default)]
    pub completion_count: u32,
}

/// Which way a completion toggle flipped a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayToggle {
    /// The day was not done and now is
    Completed,
    /// The day was done and now is not
    Cleared,
}

impl Habit {
    /// Create a new habit, due immediately and never completed
    pub fn new(id: HabitId, name: &str, url: &str, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: normalize_name(name)?,
            url: normalize_url(url),
            completed_dates: Vec::new(),
            due_date: now,
            completion_count: 0,
        })
    }

    /// Replace the name and link, leaving completion state untouched
    pub fn rename(&mut self, name: &str, url: &str) -> Result<(), DomainError> {
        let name = normalize_name(name)?;
        self.name = name;
        self.url = normalize_url(url);
        Ok(())
    }

    /// Flip a day between done and not done
    ///
    /// The caller is responsible for recomputing the due date afterwards.
    pub fn toggle_day(&mut self, day: NaiveDate) -> DayToggle {
        if let Some(position) = self.completed_dates.iter().position(|d| *d == day) {
            self.completed_dates.remove(position);
            self.completion_count = self.completion_count.saturating_sub(1);
            DayToggle::Cleared
        } else {
            self.completed_dates.push(day);
            self.completion_count += 1;
            DayToggle::Completed
        }
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_dates.contains(&day)
    }

    /// True when the due date falls on `day` (UTC calendar day)
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date.date_naive() == day
    }

    /// Most recently inserted completion day
    pub fn last_completed(&self) -> Option<NaiveDate> {
        self.completed_dates.last().copied()
    }

    /// The link, if the habit has one
    pub fn link(&self) -> Option<&str> {
        if self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }

    /// Restore the count/day-set invariants on data that came from outside
    ///
    /// Drops repeated days (keeping the first occurrence), resets the count
    /// to the number of distinct days and normalizes the name and link.
    /// Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;

        let mut seen = Vec::with_capacity(self.completed_dates.len());
        for day in self.completed_dates.drain(..) {
            if seen.contains(&day) {
                changed = true;
            } else {
                seen.push(day);
            }
        }
        self.completed_dates = seen;

        let actual = self.completed_dates.len() as u32;
        if self.completion_count != actual {
            self.completion_count = actual;
            changed = true;
        }

        let trimmed = self.name.trim();
        if trimmed.len() != self.name.len() {
            self.name = trimmed.to_string();
            changed = true;
        }

        let url = normalize_url(&self.url);
        if url != self.url {
            self.url = url;
            changed = true;
        }

        changed
    }
}

/// Trim a habit name, rejecting names that are empty afterwards
pub fn normalize_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim a link and give it `http://` if it has no scheme
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() || has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// `<scheme>://` where scheme is a letter followed by letters, digits, `+`, `-` or `.`
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
