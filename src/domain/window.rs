/// Sliding date window shown alongside the habits
///
/// The window is a run of consecutive calendar days around an anchor: a few
/// days before it, then the anchor and the days after. Paging moves the
/// anchor by a fixed step and recomputes the window from scratch.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_BACK_DAYS: u32 = 3;
pub const DEFAULT_FORWARD_DAYS: u32 = 11;
pub const DEFAULT_STEP_DAYS: u32 = 14;

/// Largest `back_days` or `forward_days` a config may ask for
pub const MAX_WINDOW_SIDE_DAYS: u32 = 366;

/// Shape of the window and how far one page moves it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Days shown before the anchor
    #[serde(default = "default_back_days")]
    pub back_days: u32,
    /// The anchor plus the days shown after it
    #[serde(default = "default_forward_days")]
    pub forward_days: u32,
    /// Days the anchor moves per page
    #[serde(default = "default_step_days")]
    pub step_days: u32,
}

fn default_back_days() -> u32 {
    DEFAULT_BACK_DAYS
}

fn default_forward_days() -> u32 {
    DEFAULT_FORWARD_DAYS
}

fn default_step_days() -> u32 {
    DEFAULT_STEP_DAYS
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            back_days: DEFAULT_BACK_DAYS,
            forward_days: DEFAULT_FORWARD_DAYS,
            step_days: DEFAULT_STEP_DAYS,
        }
    }
}

/// A paging request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Back,
    Forward,
    Today,
}

impl FromStr for Navigation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "back" | "previous" | "prev" => Ok(Navigation::Back),
            "forward" | "next" => Ok(Navigation::Forward),
            "today" => Ok(Navigation::Today),
            other => Err(DomainError::InvalidNavigation(format!(
                "'{}' (expected back, forward or today)",
                other
            ))),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Navigation::Back => "back",
            Navigation::Forward => "forward",
            Navigation::Today => "today",
        };
        f.write_str(name)
    }
}

/// `back` days before `anchor`, then `anchor` and `forward - 1` days after it
///
/// Always ascending and contiguous. Days that would fall outside the
/// representable calendar are left out.
pub fn window(anchor: NaiveDate, back: u32, forward: u32) -> Vec<NaiveDate> {
    (1..=u64::from(back))
        .rev()
        .filter_map(|offset| anchor.checked_sub_days(Days::new(offset)))
        .chain((0..u64::from(forward)).filter_map(|offset| anchor.checked_add_days(Days::new(offset))))
        .collect()
}

/// Move an anchor one page in the given direction
///
/// `Today` ignores the current anchor. An anchor that cannot move any
/// further stays where it is.
pub fn navigate(anchor: NaiveDate, navigation: Navigation, step_days: u32, today: NaiveDate) -> NaiveDate {
    let step = Days::new(u64::from(step_days));
    match navigation {
        Navigation::Back => anchor.checked_sub_days(step).unwrap_or(anchor),
        Navigation::Forward => anchor.checked_add_days(step).unwrap_or(anchor),
        Navigation::Today => today,
    }
}

/// An anchored window together with its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub anchor: NaiveDate,
    pub config: WindowConfig,
}

impl DateWindow {
    pub fn new(anchor: NaiveDate, config: WindowConfig) -> Self {
        Self { anchor, config }
    }

    /// Window anchored on `today` with the default shape
    pub fn around(today: NaiveDate) -> Self {
        Self::new(today, WindowConfig::default())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        window(self.anchor, self.config.back_days, self.config.forward_days)
    }

    /// The window one page away
    pub fn navigate(&self, navigation: Navigation, today: NaiveDate) -> Self {
        Self {
            anchor: navigate(self.anchor, navigation, self.config.step_days, today),
            config: self.config,
        }
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates().first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates().last().copied()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first <= day && day <= last,
            _ => false,
        }
    }

    /// Number of days `dates()` returns, without building them
    ///
    /// Near the ends of the calendar this is less than
    /// `back_days + forward_days`.
    pub fn len(&self) -> usize {
        let before = self.anchor.signed_duration_since(NaiveDate::MIN).num_days();
        let after = NaiveDate::MAX.signed_duration_since(self.anchor).num_days() + 1;
        let back = u64::from(self.config.back_days).min(before.unsigned_abs());
        let forward = u64::from(self.config.forward_days).min(after.unsigned_abs());
        usize::try_from(back + forward).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
