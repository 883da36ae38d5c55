/// Public library interface for the habit backoff engine
///
/// This module exports the habit store, its persistence slots and the MCP
/// server that exposes them, so they can be used by other applications or
/// tests.

use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod store;
mod config;
mod tools;
mod mcp;

// Re-export public modules and types
pub use domain::*;
pub use storage::{
    FileSlot, KeyValueSlot, MemorySlot, Persistence, SqliteSlot, StorageError, HABITS_KEY,
    SNAPSHOT_VERSION,
};
pub use store::{HabitStore, StoreError};
pub use config::{ConfigError, EngineConfig};
pub use mcp::McpServer;

/// Store over whichever slot the server was started with
pub type DynHabitStore = HabitStore<Box<dyn KeyValueSlot>>;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the habit snapshot is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// SQLite database file
    Sqlite(PathBuf),
    /// Directory holding `habits.json`
    Json(PathBuf),
}

impl StorageTarget {
    fn open_slot(&self) -> Result<Box<dyn KeyValueSlot>, StorageError> {
        let slot: Box<dyn KeyValueSlot> = match self {
            StorageTarget::Sqlite(path) => Box::new(SqliteSlot::new(path.clone())?),
            StorageTarget::Json(dir) => Box::new(FileSlot::new(dir.clone())),
        };
        Ok(slot)
    }
}

/// Habit engine served over the MCP protocol
///
/// Owns the store and the engine configuration. The MCP layer borrows the
/// store mutably for each tool call, so calls are applied one at a time.
pub struct HabitTrackerServer {
    store: DynHabitStore,
    config: EngineConfig,
}

impl HabitTrackerServer {
    /// Open the snapshot at `target` and load it into a store
    ///
    /// A missing or unreadable snapshot starts an empty collection; only a
    /// slot that cannot be opened at all is an error.
    pub async fn new(target: StorageTarget, config: EngineConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing habit engine with storage: {:?}", target);

        let slot = target.open_slot()?;
        let store = HabitStore::open(Persistence::new(slot), config.schedule);

        Ok(Self::from_store(store, config))
    }

    /// Load the engine config from `config_path` (defaults when `None`),
    /// then open `target` with it
    pub async fn open(target: StorageTarget, config_path: Option<&Path>) -> Result<Self, ServerError> {
        let config = match config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        Self::new(target, config).await
    }

    /// Wrap an already opened store
    pub fn from_store(store: DynHabitStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(
            "Server started successfully, found {} existing habits",
            self.store.len()
        );

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn store(&self) -> &DynHabitStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DynHabitStore {
        &mut self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
