/// MCP tools for habit management
///
/// This module contains the MCP tools that external clients can call to
/// drive the habit engine. Each tool parses its arguments, calls exactly one
/// store operation or query, and formats the result.

pub mod add;
pub mod edit;
pub mod delete;
pub mod toggle;
pub mod list;
pub mod window;

// Re-export tool functions for easy access
pub use add::*;
pub use edit::*;
pub use delete::*;
pub use toggle::*;
pub use list::*;
pub use window::*;
