/// JSON-RPC sessions against a server opened on disk
use habit_backoff::*;
use serde_json::{json, Value};
use tempfile::tempdir;

async fn send(server: &mut McpServer, request: Value) -> Value {
    let response = server
        .process_line(&request.to_string())
        .await
        .expect("request should get a response");
    serde_json::to_value(response).unwrap()
}

async fn call_tool(server: &mut McpServer, id: u64, name: &str, arguments: Value) -> Value {
    send(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await
}

#[tokio::test]
async fn test_session_persists_to_json_dir() {
    let temp_dir = tempdir().unwrap();
    let target = StorageTarget::Json(temp_dir.path().to_path_buf());

    let server = HabitTrackerServer::new(target.clone(), EngineConfig::default())
        .await
        .expect("Failed to create server");
    let mut mcp = McpServer::new(server);

    let init = send(&mut mcp, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
    assert_eq!(init["result"]["serverInfo"]["name"], json!("Habit Backoff"));

    let added = call_tool(&mut mcp, 2, "habit_add", json!({"name": "Meditate", "url": "calm.example"})).await;
    assert_eq!(added["result"]["isError"], json!(false));
    let id = mcp.habit_tracker().store().habits()[0].id;

    let toggled = call_tool(&mut mcp, 3, "habit_toggle", json!({"habit_id": id.value()})).await;
    assert_eq!(toggled["result"]["isError"], json!(false));

    let edited = call_tool(
        &mut mcp,
        4,
        "habit_edit",
        json!({"habit_id": id.value(), "name": "Meditate daily"}),
    )
    .await;
    assert_eq!(edited["result"]["isError"], json!(false));

    let reopened = HabitTrackerServer::new(target, EngineConfig::default())
        .await
        .expect("Failed to reopen server");
    let habit = &reopened.store().habits()[0];
    assert_eq!(habit.name, "Meditate daily");
    assert_eq!(habit.url, "http://calm.example");
    assert_eq!(habit.completion_count, 1);
    assert!(habit.is_completed_on(reopened.store().today()));
}

#[tokio::test]
async fn test_sqlite_server_window_and_delete() {
    let temp_dir = tempdir().unwrap();
    let target = StorageTarget::Sqlite(temp_dir.path().join("habits.db"));
    let config = EngineConfig::from_toml_str("[window]\nstep_days = 7\n").unwrap();

    let server = HabitTrackerServer::new(target.clone(), config)
        .await
        .expect("Failed to create server");
    let mut mcp = McpServer::new(server);
    let today = mcp.habit_tracker().store().today();

    call_tool(&mut mcp, 1, "habit_add", json!({"name": "Journal"})).await;
    let window = call_tool(&mut mcp, 2, "habit_window", json!({"navigate": "forward"})).await;
    assert!(window["result"]["content"][0]["text"].as_str().unwrap().contains("Journal"));
    assert_eq!(mcp.window().anchor, today + chrono::Duration::days(7));

    let id = mcp.habit_tracker().store().habits()[0].id;
    let deleted = call_tool(&mut mcp, 3, "habit_delete", json!({"habit_id": id.to_string()})).await;
    assert_eq!(deleted["result"]["isError"], json!(false));
    let again = call_tool(&mut mcp, 4, "habit_delete", json!({"habit_id": id.to_string()})).await;
    assert_eq!(again["result"]["isError"], json!(false));

    let reopened = HabitTrackerServer::new(target, config)
        .await
        .expect("Failed to reopen server");
    assert!(reopened.store().is_empty());
}

#[tokio::test]
async fn test_errors_do_not_touch_state() {
    let temp_dir = tempdir().unwrap();
    let server = HabitTrackerServer::new(
        StorageTarget::Json(temp_dir.path().to_path_buf()),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    let mut mcp = McpServer::new(server);

    let blank = call_tool(&mut mcp, 1, "habit_add", json!({"name": "   "})).await;
    assert_eq!(blank["result"]["isError"], json!(true));

    let missing = call_tool(&mut mcp, 2, "habit_toggle", json!({"habit_id": 12345})).await;
    assert_eq!(missing["result"]["isError"], json!(true));

    assert!(mcp.habit_tracker().store().is_empty());
    assert!(!temp_dir.path().join("habits.json").exists());
}

#[tokio::test]
async fn test_open_reads_config_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("engine.toml");
    std::fs::write(&config_path, "[window]\nstep_days = 7\n").unwrap();

    let server = HabitTrackerServer::open(
        StorageTarget::Json(temp_dir.path().join("data")),
        Some(&config_path),
    )
    .await
    .expect("Failed to open server");
    assert_eq!(server.config().window.step_days, 7);

    std::fs::write(&config_path, "[window]\nback_days = 100000\n").unwrap();
    let rejected = HabitTrackerServer::open(
        StorageTarget::Json(temp_dir.path().join("data")),
        Some(&config_path),
    )
    .await;
    assert!(matches!(rejected, Err(ServerError::Config(ConfigError::Invalid(_)))));

    let missing = HabitTrackerServer::open(
        StorageTarget::Json(temp_dir.path().join("data")),
        Some(&temp_dir.path().join("absent.toml")),
    )
    .await;
    assert!(matches!(missing, Err(ServerError::Config(ConfigError::Io(_)))));
}
