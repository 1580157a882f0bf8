//! Tool catalog exposed to the LLM
//!
//! Every tool receives the [`Registry`](crate::registry::Registry) explicitly and
//! answers with a JSON value. Unmet preconditions (unknown dataset, missing column)
//! are reported as an `{"error": ...}` payload so the model can recover; malformed
//! input surfaces as a [`ToolError`].

pub mod catalog;
pub mod implementations;
pub mod system;
pub mod trait_def;

pub use catalog::ToolCatalog;
pub use system::ToolSystem;
pub use trait_def::Tool;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::data::DataError;
use crate::plot::PlotError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error("Failed to encode tool result: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Structured failure payload handed back to the model
pub fn error_payload(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}

/// Returns the message of an `{"error": ...}` payload
pub fn payload_error(value: &Value) -> Option<&str> {
    value.get("error").and_then(Value::as_str)
}

pub(crate) fn parse_args<T: DeserializeOwned>(tool: &'static str, arguments: Value) -> Result<T, ToolError> {
    // models sometimes send null instead of an empty object
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments { tool, source })
}
