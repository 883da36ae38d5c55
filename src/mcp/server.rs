/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Dispatches tool calls to the habit store
/// 3. Sends JSON-RPC responses to stdout

use std::collections::HashMap;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::domain::{DateWindow, HabitId};
use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitTrackerServer, ServerError};

/// MCP server that handles communication with a client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Window the client is currently looking at
    window: DateWindow,
    /// Whether the client has sent `initialized`
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server with the window anchored on today
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        let window = DateWindow::new(habit_tracker.store().today(), habit_tracker.config().window);
        Self {
            habit_tracker,
            window,
            initialized: false,
        }
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn habit_tracker(&self) -> &HabitTrackerServer {
        &self.habit_tracker
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let method = request.method.as_str();
        if method == "initialized" || method == "notifications/initialized" {
            self.initialized = true;
            return request.id.map(|id| JsonRpcResponse::success(id, json!(null)));
        }

        let Some(id) = request.id else {
            debug!("Ignoring notification '{}'", method);
            return None;
        };

        let response = match method {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Backoff".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&mut self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            ToolDefinition {
                name: "habit_add".to_string(),
                description: "Add a habit to track. It is due immediately.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the habit"},
                        "url": {"type": "string", "description": "Optional link; http:// is added if no scheme is given"}
                    },
                    "required": ["name"]
                }),
            },
            ToolDefinition {
                name: "habit_edit".to_string(),
                description: "Rename a habit or change its link".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "habit_id": {"type": "integer", "description": "ID of the habit to edit"},
                        "name": {"type": "string", "description": "New name"},
                        "url": {"type": "string", "description": "New link (optional; omit to keep, empty to remove)"}
                    },
                    "required": ["habit_id", "name"]
                }),
            },
            ToolDefinition {
                name: "habit_delete".to_string(),
                description: "Delete a habit. Deleting an unknown id does nothing.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "habit_id": {"type": "integer", "description": "ID of the habit to delete"}
                    },
                    "required": ["habit_id"]
                }),
            },
            ToolDefinition {
                name: "habit_toggle".to_string(),
                description: "Mark a habit done on a day, or clear it if already done. Reschedules the due date with exponential backoff.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "habit_id": {"type": "integer", "description": "ID of the habit"},
                        "date": {"type": "string", "description": "Day to toggle (YYYY-MM-DD, optional - defaults to today)"}
                    },
                    "required": ["habit_id"]
                }),
            },
            ToolDefinition {
                name: "habit_list".to_string(),
                description: "List all habits with completion counts and due dates".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
            ToolDefinition {
                name: "habit_window".to_string(),
                description: "Show completed and due days for every habit across the current date window, optionally paging it".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "anchor": {"type": "string", "description": "Anchor the window on this day (YYYY-MM-DD, optional)"},
                        "navigate": {"type": "string", "description": "'back', 'forward' or 'today' (optional)"}
                    },
                    "required": []
                }),
            },
        ];

        JsonRpcResponse::success(id, json!({"tools": tools}))
    }

    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let args = tool_params.arguments;
        let result = match tool_params.name.as_str() {
            "habit_add" => self.call_habit_add(args),
            "habit_edit" => self.call_habit_edit(args),
            "habit_delete" => self.call_habit_delete(args),
            "habit_toggle" => self.call_habit_toggle(args),
            "habit_list" => self.call_habit_list(),
            "habit_window" => self.call_habit_window(args),
            _ => ToolCallResult::error(
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", tool_params.name),
            ),
        };

        to_response(id, &result)
    }

    fn call_habit_add(&mut self, args: HashMap<String, Value>) -> ToolCallResult {
        let params = tools::AddHabitParams {
            name: arg_str(&args, "name").unwrap_or_default(),
            url: arg_str(&args, "url"),
        };

        match tools::add_habit(self.habit_tracker.store_mut(), params) {
            Ok(response) => ToolCallResult::success(format!(
                "{}\nHabit ID: {}",
                response.message, response.habit_id
            )),
            Err(e) => ToolCallResult::from_store_error(&e),
        }
    }

    fn call_habit_edit(&mut self, args: HashMap<String, Value>) -> ToolCallResult {
        let habit_id = match arg_habit_id(&args) {
            Ok(habit_id) => habit_id,
            Err(message) => return ToolCallResult::error(error_codes::INVALID_PARAMS, message),
        };
        let params = tools::EditHabitParams {
            habit_id,
            name: arg_str(&args, "name").unwrap_or_default(),
            url: arg_str(&args, "url"),
        };

        match tools::edit_habit(self.habit_tracker.store_mut(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::from_store_error(&e),
        }
    }

    fn call_habit_delete(&mut self, args: HashMap<String, Value>) -> ToolCallResult {
        let habit_id = match arg_habit_id(&args) {
            Ok(habit_id) => habit_id,
            Err(message) => return ToolCallResult::error(error_codes::INVALID_PARAMS, message),
        };

        match tools::delete_habit(self.habit_tracker.store_mut(), tools::DeleteHabitParams { habit_id }) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::from_store_error(&e),
        }
    }

    fn call_habit_toggle(&mut self, args: HashMap<String, Value>) -> ToolCallResult {
        let habit_id = match arg_habit_id(&args) {
            Ok(habit_id) => habit_id,
            Err(message) => return ToolCallResult::error(error_codes::INVALID_PARAMS, message),
        };
        let params = tools::ToggleHabitParams {
            habit_id,
            date: arg_str(&args, "date"),
        };

        match tools::toggle_habit(self.habit_tracker.store_mut(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::from_store_error(&e),
        }
    }

    fn call_habit_list(&mut self) -> ToolCallResult {
        ToolCallResult::success(tools::list_habits(self.habit_tracker.store()).message)
    }

    fn call_habit_window(&mut self, args: HashMap<String, Value>) -> ToolCallResult {
        let params = tools::WindowParams {
            anchor: arg_str(&args, "anchor"),
            navigate: arg_str(&args, "navigate"),
        };

        match tools::habit_window(self.habit_tracker.store(), &self.window, params) {
            Ok(response) => {
                self.window = response.window;
                ToolCallResult::success(response.message)
            }
            Err(e) => ToolCallResult::from_store_error(&e),
        }
    }
}

fn to_response<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}

fn arg_str(args: &HashMap<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// `habit_id` as a JSON integer or a numeric string
fn arg_habit_id(args: &HashMap<String, Value>) -> Result<HabitId, String> {
    match args.get("habit_id") {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(HabitId)
            .ok_or_else(|| format!("habit_id must be an integer, got {}", n)),
        Some(Value::String(s)) => s
            .parse::<HabitId>()
            .map_err(|_| format!("habit_id must be an integer, got '{}'", s)),
        Some(other) => Err(format!("habit_id must be an integer, got {}", other)),
        None => Err("habit_id is required".to_string()),
    }
}
