//! Chat sessions
//!
//! A session keeps the conversation history and the active dataset, and runs the
//! tool invocation loop between the user, the LLM and the tool catalog.

mod assistant;
pub mod conversation;

pub use assistant::{
    AssistantSession, SessionOptions, TurnError, PROMPT_PREAMBLE, SYSTEM_INSTRUCTIONS,
};
pub use conversation::{Conversation, Role, Turn};
