//! Tool catalog
//!
//! The fixed set of tools offered to the LLM.

use std::sync::Arc;

use super::implementations::*;
use super::trait_def::Tool;
use crate::llm::ToolDefinition;
use crate::plot::PlotSettings;

pub struct ToolCatalog {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolCatalog {
    pub fn new(plot_settings: PlotSettings) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(LoadCsvTool),
            Arc::new(SummarizeDataTool),
            Arc::new(RunLinearRegressionTool),
            Arc::new(PredictLinearRegressionTool),
            Arc::new(ListDatasetsTool),
            Arc::new(ListModelsTool),
            Arc::new(PlotDataTool::new(plot_settings)),
        ];

        Self { tools }
    }

    /// Get all tools as ToolDefinition for LLMClient trait
    pub fn as_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.schema(),
            })
            .collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
