/// In-memory key/value slot
///
/// Nothing survives the process. Used by tests and by callers that want an
/// engine without touching disk.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::storage::{KeyValueSlot, StorageError};

/// Uses `RefCell` for interior mutability since the engine is single-threaded.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RefCell<HashMap<String, String>>,
    simulate_write_error: RefCell<bool>,
    writes: RefCell<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail until switched off again
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Put a raw value in place, bypassing the write counter
    pub fn insert(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if *self.simulate_write_error.borrow() {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
            });
        }
        self.insert(key, value);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
