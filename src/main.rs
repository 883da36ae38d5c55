/// Main entry point for the habit backoff MCP server
///
/// This file sets up logging, parses command line arguments, loads the
/// engine config and starts the MCP server. The server listens for JSON-RPC
/// requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use habit_backoff::{HabitTrackerServer, ServerError, StorageTarget};

/// Find a writable data directory, trying the usual places in order
fn get_default_data_dir() -> std::io::Result<PathBuf> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit_backoff")),
        dirs::data_dir().map(|p| p.join("habit_backoff")),
        dirs::config_dir().map(|p| p.join("habit_backoff")),
        std::env::current_dir().ok().map(|p| p.join(".habit_backoff")),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() && is_writable(potential_path) {
            return Ok(potential_path.clone());
        }
    }

    let temp_path = std::env::temp_dir().join("habit_backoff");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for habit data: {}", temp_path.display());
    Ok(temp_path)
}

fn is_writable(dir: &Path) -> bool {
    let test_file = dir.join(".test_write");
    if std::fs::write(&test_file, "test").is_ok() {
        let _ = std::fs::remove_file(&test_file);
        true
    } else {
        false
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// Command line arguments for the habit backoff MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If neither this nor --json is given, uses a default location in the user's home directory
    #[arg(long, conflicts_with = "json")]
    database: Option<PathBuf>,

    /// Keep the habit snapshot as habits.json inside this directory instead of SQLite
    #[arg(long)]
    json: Option<PathBuf>,

    /// TOML file with [schedule] and [window] settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_backoff={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();

    info!("Starting habit backoff MCP server");

    let target = match (args.database, args.json) {
        (Some(path), _) => {
            ensure_parent(&path)?;
            StorageTarget::Sqlite(path)
        }
        (None, Some(dir)) => StorageTarget::Json(dir),
        (None, None) => StorageTarget::Sqlite(get_default_data_dir()?.join("habits.db")),
    };

    info!("Using storage: {:?}", target);

    let server = HabitTrackerServer::open(target, args.config.as_deref()).await?;
    server.run().await?;

    info!("Habit backoff MCP server shutdown complete");
    Ok(())
}
