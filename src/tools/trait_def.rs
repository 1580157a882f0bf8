use serde_json::Value;

use super::ToolError;
use crate::registry::Registry;

pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON Schema of the arguments object
    fn schema(&self) -> Value;
    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError>;
}
