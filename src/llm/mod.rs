//! LLM client abstraction layer
//!
//! A provider-neutral chat interface with tool calling. [`GenAIClient`] talks to a
//! real provider; [`MockLLMClient`] replays scripted responses in tests.

mod client;
mod error;
mod genai_client;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai_client::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole, ToolCall, ToolDefinition};
