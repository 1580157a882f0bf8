use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::conversation::Conversation;
use crate::llm::{BackendError, ChatMessage, LLMClient, LLMRequest};
use crate::tools::{error_payload, payload_error, ToolSystem};

pub const SYSTEM_INSTRUCTIONS: &str = "You are Melody, a helpful and friendly data science expert \
that can analyze datasets using tools. You have access to a list_datasets tool that shows which \
datasets are loaded at any time; use it before stating that no datasets are loaded. Datasets and \
models persist between sessions, so run list_datasets and list_models before answering to check \
what the user had in a previous session. NEVER make up values that were not obtained by calling \
tools. Keep analyses and summaries concise and informative. Do not state the file path of plots \
you generate; they are displayed automatically. Format model evaluations as bullet points and do \
not use markdown formatting.";

pub const PROMPT_PREAMBLE: &str = "You are Melody, a helpful data science assistant.";

const DATASET_EXTENSIONS: [&str; 2] = [".csv", ".tsv"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Tool-executing round trips allowed per user turn
    pub max_tool_rounds: usize,
    pub temperature: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_tool_rounds: 8,
            temperature: 0.0,
        }
    }
}

/// Why a turn produced no model reply. The `Display` text is shown to the user as is.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Failed to load dataset: {0}")]
    DatasetLoad(String),

    #[error("Error during generation: {0}")]
    Generation(#[from] BackendError),

    #[error("Error: Model returned no text.")]
    EmptyResponse,

    #[error("Error during generation: exceeded {0} tool rounds")]
    ToolRoundsExceeded(usize),
}

pub struct AssistantSession {
    client: Arc<dyn LLMClient>,
    tools: ToolSystem,
    conversation: Conversation,
    current_dataset: Option<String>,
    options: SessionOptions,
}

impl AssistantSession {
    pub fn new(client: Arc<dyn LLMClient>, tools: ToolSystem, options: SessionOptions) -> Self {
        Self {
            client,
            tools,
            conversation: Conversation::new(SYSTEM_INSTRUCTIONS),
            current_dataset: None,
            options,
        }
    }

    /// Handles one line of user input and returns the text to show.
    ///
    /// Failures are rendered as their user-facing message; the conversation is only
    /// extended when the turn succeeds.
    pub async fn handle_message(&mut self, raw: &str) -> String {
        match self.respond(raw).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Turn failed");
                e.to_string()
            }
        }
    }

    pub async fn respond(&mut self, raw: &str) -> Result<String, TurnError> {
        let input = raw.trim().trim_matches('"').trim();

        if is_dataset_path(input) {
            return self.switch_dataset(input);
        }

        self.ask_model(input).await
    }

    /// Loads `path` directly, bypassing the LLM, and makes it the active dataset
    pub fn switch_dataset(&mut self, path: &str) -> Result<String, TurnError> {
        let result = self
            .tools
            .execute("load_csv", json!({ "file_path": path }))
            .map_err(|e| TurnError::DatasetLoad(e.to_string()))?;
        if let Some(message) = payload_error(&result) {
            return Err(TurnError::DatasetLoad(message.to_string()));
        }

        let columns: Vec<&str> = result["columns"]
            .as_array()
            .map(|cols| cols.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let rows = result["num_rows"].as_u64().unwrap_or(0);

        self.current_dataset = Some(path.to_string());
        self.conversation
            .push_user(format!("I've uploaded a new dataset located at {}.", path));
        self.conversation
            .push_model(format!("Got it! The dataset path is now {}.", path));

        info!(path, columns = columns.len(), rows, "Active dataset switched");

        Ok(format!(
            "Server loaded dataset successfully!\nColumns: [{}]\nRows: {}",
            columns.join(", "),
            rows
        ))
    }

    async fn ask_model(&mut self, input: &str) -> Result<String, TurnError> {
        let hint = match &self.current_dataset {
            Some(path) => format!("The dataset '{}' has been loaded and is ready for analysis.", path),
            None => "No dataset loaded yet. Please upload a CSV file first.".to_string(),
        };
        let augmented = format!("{}\n{}", input, hint);

        let prompt =
            self.conversation
                .flatten(PROMPT_PREAMBLE, self.current_dataset.as_deref(), &augmented);
        let mut messages = vec![
            ChatMessage::system(self.conversation.system_instructions()),
            ChatMessage::user(prompt),
        ];
        let tool_definitions = self.tools.as_tool_definitions();

        let mut rounds = 0;
        loop {
            let request = LLMRequest::new(messages.clone())
                .with_tools(tool_definitions.clone())
                .with_temperature(self.options.temperature);

            let response = self.client.chat(request).await?;
            debug!(
                round = rounds,
                tool_calls = response.tool_calls.len(),
                response_ms = response.response_time.as_millis() as u64,
                "LLM responded"
            );

            if !response.has_tool_calls() {
                let reply = response.content.trim();
                if reply.is_empty() {
                    return Err(TurnError::EmptyResponse);
                }

                self.conversation.push_user(augmented);
                self.conversation.push_model(reply);
                return Ok(reply.to_string());
            }

            if rounds == self.options.max_tool_rounds {
                return Err(TurnError::ToolRoundsExceeded(self.options.max_tool_rounds));
            }
            rounds += 1;

            messages.push(ChatMessage::assistant_with_tools(
                &response.content,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                // errors go back to the model so it can correct itself
                let output = match self.tools.execute(&call.name, call.arguments.clone()) {
                    Ok(output) => output,
                    Err(e) => error_payload(e),
                };
                messages.push(ChatMessage::tool_response(&call.call_id, &output));
            }
        }
    }

    pub fn current_dataset(&self) -> Option<&str> {
        self.current_dataset.as_deref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn tools(&self) -> &ToolSystem {
        &self.tools
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }
}

fn is_dataset_path(input: &str) -> bool {
    let lower = input.to_lowercase();
    DATASET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) && Path::new(input).is_file()
}
