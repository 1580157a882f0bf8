//! Conversation flow against a scripted model

use melody::llm::{BackendError, MessageRole, MockLLMClient, MockResponse};
use melody::plot::PlotSettings;
use melody::registry::{Registry, RegistryPaths};
use melody::session::{AssistantSession, Role, SessionOptions};
use melody::tools::{ToolCatalog, ToolSystem};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn setup(dir: &TempDir) -> (Arc<MockLLMClient>, AssistantSession) {
    let registry = Registry::open(RegistryPaths::in_dir(dir.path())).unwrap();
    let tools = ToolSystem::new(
        ToolCatalog::new(PlotSettings::new(dir.path().join("plots"), "/static/plots")),
        registry,
    );
    let mock = Arc::new(MockLLMClient::new());
    let session = AssistantSession::new(mock.clone(), tools, SessionOptions::default());
    (mock, session)
}

fn write_csv(dir: &TempDir) -> String {
    let path = dir.path().join("houses.csv");
    fs::write(&path, "rooms,price\n1,100\n2,150\n3,200\n4,250\n").unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_dataset_then_regression_conversation() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let (mock, mut session) = setup(&dir);

    let loaded = session.handle_message(&format!("\"{}\"", csv)).await;
    assert_eq!(
        loaded,
        "Server loaded dataset successfully!\nColumns: [rooms, price]\nRows: 4"
    );
    assert_eq!(session.current_dataset(), Some(csv.as_str()));
    assert_eq!(mock.request_count(), 0);

    mock.add_responses([
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::tool_call(
                "call_1",
                "run_linear_regression",
                json!({ "file_path": csv, "x_cols": ["rooms"], "y_col": "price" }),
            )],
        ),
        MockResponse::with_tool_calls(
            "",
            vec![MockLLMClient::tool_call(
                "call_2",
                "predict_linear_regression",
                json!({ "model_name": "model_houses_price", "x_values": [5.0] }),
            )],
        ),
        MockResponse::text("Each extra room adds 50; five rooms predicts 300."),
    ]);

    let reply = session
        .handle_message("How does price depend on rooms? Predict 5 rooms.")
        .await;
    assert_eq!(reply, "Each extra room adds 50; five rooms predicts 300.");
    assert_eq!(mock.request_count(), 3);

    let last = mock.requests().pop().unwrap();
    let tool_messages: Vec<Value> = last
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .map(|m| serde_json::from_str(&m.content).unwrap())
        .collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0]["model_name"], "model_houses_price");
    let predicted = tool_messages[1]["predictions"][0].as_f64().unwrap();
    assert!((predicted - 300.0).abs() < 1e-9);

    let prompt = &last.messages[1].content;
    assert!(prompt.contains(&format!("Current dataset path: {}", csv)));
    assert!(prompt.contains(&format!(
        "The dataset '{}' has been loaded and is ready for analysis.",
        csv
    )));

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[3].role, Role::Model);
    assert_eq!(turns[3].content, reply);

    assert!(session.tools().registry().model("model_houses_price").is_some());
}

#[tokio::test]
async fn test_tool_errors_are_reported_to_model() {
    let dir = TempDir::new().unwrap();
    let (mock, mut session) = setup(&dir);

    mock.add_responses([
        MockResponse::with_tool_calls(
            "",
            vec![
                MockLLMClient::tool_call("bad", "no_such_tool", json!({})),
                MockLLMClient::tool_call("missing", "summarize_data", json!({ "file_path": "x.csv" })),
            ],
        ),
        MockResponse::text("Please upload a dataset first."),
    ]);

    let reply = session.handle_message("summarise my data").await;
    assert_eq!(reply, "Please upload a dataset first.");

    let last = mock.requests().pop().unwrap();
    let errors: Vec<String> = last
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .map(|m| {
            let payload: Value = serde_json::from_str(&m.content).unwrap();
            payload["error"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        errors,
        vec![
            "Unknown tool: no_such_tool".to_string(),
            "Dataset not loaded. Call load_csv first.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_turn_leaves_history_untouched() {
    let dir = TempDir::new().unwrap();
    let (mock, mut session) = setup(&dir);

    mock.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 5 }));
    let reply = session.handle_message("hello").await;
    assert!(reply.starts_with("Error during generation:"));
    assert!(session.conversation().is_empty());

    mock.add_response(MockResponse::text("   "));
    let reply = session.handle_message("hello again").await;
    assert_eq!(reply, "Error: Model returned no text.");
    assert!(session.conversation().is_empty());

    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "").unwrap();
    let reply = session.handle_message(&empty.to_string_lossy()).await;
    assert!(reply.starts_with("Failed to load dataset:"));
    assert!(session.current_dataset().is_none());
}
