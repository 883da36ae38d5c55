/// Storage layer for persisting the habit collection
///
/// The engine keeps its whole state in one serialized snapshot stored under
/// a fixed key in a durable key/value slot. Slots only move strings around;
/// `Persistence` owns the JSON layout and the "unreadable means empty" rule.

pub mod sqlite;
pub mod migrations;
pub mod file;
pub mod memory;

// Re-export the main storage types
pub use sqlite::*;
pub use file::*;
pub use memory::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Habit, HabitId};

/// Key the habit snapshot lives under
pub const HABITS_KEY: &str = "habits";

/// Version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Write rejected for key '{key}'")]
    WriteRejected { key: String },
}

/// A durable place to keep strings by key
///
/// This trait allows the snapshot to live in SQLite, a plain file, or memory
/// while the rest of the engine stays the same.
pub trait KeyValueSlot {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace whatever is stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueSlot + ?Sized> KeyValueSlot for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

impl<S: KeyValueSlot + ?Sized> KeyValueSlot for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// Snapshot as written
#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    habits: &'a [Habit],
}

/// Snapshot as read: the versioned envelope, or the bare array written by
/// earlier versions of the app
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotIn {
    Versioned { version: u32, habits: Vec<Habit> },
    Legacy(Vec<Habit>),
}

/// Loads and saves the habit collection through a slot
pub struct Persistence<S> {
    slot: S,
}

impl<S: KeyValueSlot> Persistence<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Load the stored collection
    ///
    /// Never fails: a missing, unreadable or malformed snapshot yields an
    /// empty collection. Records that break the collection's invariants are
    /// repaired or dropped.
    pub fn load(&self) -> Vec<Habit> {
        let payload = match self.slot.read(HABITS_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No stored habits under '{}', starting empty", HABITS_KEY);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read stored habits, starting empty: {}", e);
                return Vec::new();
            }
        };

        match decode(&payload) {
            Ok(habits) => {
                let habits = sanitize(habits);
                debug!("Loaded {} habits", habits.len());
                habits
            }
            Err(reason) => {
                warn!("Stored habits are unreadable, starting empty: {}", reason);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored snapshot with `habits`
    pub fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&SnapshotOut {
            version: SNAPSHOT_VERSION,
            habits,
        })?;
        self.slot.write(HABITS_KEY, &payload)?;
        debug!("Saved {} habits ({} bytes)", habits.len(), payload.len());
        Ok(())
    }
}

fn decode(payload: &str) -> Result<Vec<Habit>, String> {
    match serde_json::from_str::<SnapshotIn>(payload).map_err(|e| e.to_string())? {
        SnapshotIn::Legacy(habits) => Ok(habits),
        SnapshotIn::Versioned { version, habits } if version <= SNAPSHOT_VERSION => Ok(habits),
        SnapshotIn::Versioned { version, .. } => Err(format!(
            "snapshot version {} is newer than supported version {}",
            version, SNAPSHOT_VERSION
        )),
    }
}

/// Drop blank-named and duplicate-id habits, repair the rest
fn sanitize(habits: Vec<Habit>) -> Vec<Habit> {
    let mut seen: Vec<HabitId> = Vec::with_capacity(habits.len());
    let mut kept = Vec::with_capacity(habits.len());

    for mut habit in habits {
        if habit.name.trim().is_empty() {
            warn!("Dropping stored habit {} with an empty name", habit.id);
            continue;
        }
        if seen.contains(&habit.id) {
            warn!("Dropping stored habit '{}': id {} already used", habit.name, habit.id);
            continue;
        }
        if habit.repair() {
            warn!("Repaired completion data of stored habit '{}' ({})", habit.name, habit.id);
        }
        seen.push(habit.id);
        kept.push(habit);
    }

    kept
}
