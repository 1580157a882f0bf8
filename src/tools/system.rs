use serde_json::Value;
use tracing::{debug, info, warn};

use super::catalog::ToolCatalog;
use super::{payload_error, ToolError};
use crate::llm::ToolDefinition;
use crate::registry::Registry;

/// Dispatches tool calls by name against an owned registry
pub struct ToolSystem {
    catalog: ToolCatalog,
    registry: Registry,
}

impl ToolSystem {
    pub fn new(catalog: ToolCatalog, registry: Registry) -> Self {
        Self { catalog, registry }
    }

    /// Execute a tool and return structured JSON result
    pub fn execute(&mut self, tool_name: &str, arguments: Value) -> Result<Value, ToolError> {
        info!(tool = tool_name, args = ?arguments, "Executing tool");

        let tool = self
            .catalog
            .get_tool(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let result = tool.execute(&mut self.registry, arguments);

        match &result {
            Ok(output) => {
                if let Some(message) = payload_error(output) {
                    info!(tool = tool_name, error = message, "Tool reported a precondition failure");
                } else {
                    info!(tool = tool_name, "Tool execution completed");
                }
                let output_preview = serde_json::to_string(output).unwrap_or_default();
                let preview: String = output_preview.chars().take(200).collect();
                debug!(tool = tool_name, output_preview = %preview, "Tool output preview");
            }
            Err(e) => {
                warn!(tool = tool_name, error = %e, "Tool execution failed");
            }
        }

        result
    }

    pub fn as_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.catalog.as_tool_definitions()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.catalog.tool_names()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
}
