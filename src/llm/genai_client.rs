//! GenAI-based LLM client
//!
//! Works with any provider the `genai` crate supports (Gemini by default). API keys are
//! read by `genai` from the provider's usual environment variable, e.g. `GEMINI_API_KEY`.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole, ToolCall, ToolDefinition};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{
    ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest, MessageContent,
    Tool as GenAITool, ToolResponse,
};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Overrides the provider's default endpoint when set
pub const API_BASE_URL_ENV: &str = "MELODY_API_BASE_URL";

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    pub fn new(provider: AdapterKind, model: String, timeout: Duration) -> Result<Self, BackendError> {
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: "model name must not be empty".to_string(),
            });
        }

        let client = match std::env::var(API_BASE_URL_ENV).ok().filter(|u| !u.is_empty()) {
            Some(endpoint_url) => {
                debug!(
                    provider = provider.as_str(),
                    endpoint = %endpoint_url,
                    "Using custom endpoint"
                );
                Self::client_for_endpoint(provider, model.clone(), endpoint_url)
            }
            None => Client::default(),
        };

        debug!(provider = provider.as_str(), model = %model, "Created GenAI client");

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    fn client_for_endpoint(provider: AdapterKind, model: String, endpoint_url: String) -> Client {
        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |_service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let auth = match provider.default_key_env_name() {
                    Some(api_key_var) => AuthData::from_env(api_key_var),
                    None => AuthData::from_single(""),
                };

                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(endpoint_url.clone()),
                    auth,
                    model: ModelIden::new(provider, &model),
                })
            },
        );

        Client::builder()
            .with_service_target_resolver(resolver)
            .build()
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => match &msg.tool_calls {
                Some(tool_calls) if !tool_calls.is_empty() => {
                    let genai_calls: Vec<genai::chat::ToolCall> = tool_calls
                        .iter()
                        .map(|tc| genai::chat::ToolCall {
                            call_id: tc.call_id.clone(),
                            fn_name: tc.name.clone(),
                            fn_arguments: tc.arguments.clone(),
                        })
                        .collect();
                    GenAIChatMessage::assistant(MessageContent::from_tool_calls(genai_calls))
                }
                _ => GenAIChatMessage::assistant(&msg.content),
            },
            MessageRole::Tool => ToolResponse {
                call_id: msg.tool_call_id.clone().unwrap_or_default(),
                content: msg.content.clone(),
            }
            .into(),
        }
    }

    fn convert_tool(tool: &ToolDefinition) -> GenAITool {
        GenAITool::new(&tool.name)
            .with_description(&tool.description)
            .with_schema(tool.parameters.clone())
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let tools: Vec<GenAITool> = request.tools.iter().map(Self::convert_tool).collect();

        let mut genai_request = GenAIChatRequest::new(messages);
        if !tools.is_empty() {
            genai_request = genai_request.with_tools(tools);
        }

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!(provider = self.provider.as_str(), error = %e, "LLM request failed");
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.as_str(), e),
                });
            }
            Err(_) => {
                error!(
                    provider = self.provider.as_str(),
                    seconds = self.timeout.as_secs(),
                    "LLM request timed out"
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();
        let tool_calls: Vec<ToolCall> = response
            .tool_calls()
            .into_iter()
            .map(|tc| ToolCall {
                call_id: tc.call_id.clone(),
                name: tc.fn_name.clone(),
                arguments: tc.fn_arguments.clone(),
            })
            .collect();

        debug!(
            provider = self.provider.as_str(),
            tool_calls = tool_calls.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "LLM response received"
        );

        Ok(LLMResponse::with_tool_calls(content, tool_calls, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
