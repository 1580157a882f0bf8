//! melody - a data-science chat assistant
//!
//! A conversational front end over a small analysis toolkit. The language model decides
//! when to call tools that load CSV datasets, summarise columns, fit and apply ordinary
//! least-squares regressions and render plots; melody executes those calls against a
//! persistent registry and feeds the results back until the model answers in text.
//!
//! # Example Usage
//!
//! ```no_run
//! use melody::{MelodyConfig, AssistantSession};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MelodyConfig::from_env()?;
//! let client = config.create_client()?;
//! let tools = config.open_tool_system()?;
//! let mut session = AssistantSession::new(client, tools, config.session_options());
//!
//! println!("{}", session.handle_message("data/iris.csv").await);
//! println!("{}", session.handle_message("Fit petal_width from petal_length").await);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`data`]: CSV datasets, column statistics and linear regression
//! - [`registry`]: persistent store of datasets and fitted models
//! - [`plot`]: PNG scatter plots and histograms
//! - [`tools`]: the callable tool catalog and its executor
//! - [`llm`]: chat client abstraction over genai, plus a scripted mock
//! - [`session`]: conversation state and the tool-calling loop

pub mod cli;
pub mod config;
pub mod data;
pub mod llm;
pub mod plot;
pub mod registry;
pub mod session;
pub mod tools;
pub mod util;

pub use config::{ConfigError, MelodyConfig};
pub use data::{Dataset, LinearModel};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient, MockResponse};
pub use plot::{PlotKind, PlotSettings};
pub use registry::{Registry, RegistryError, RegistryPaths};
pub use session::{AssistantSession, SessionOptions, TurnError};
pub use tools::{ToolCatalog, ToolError, ToolSystem};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_and_name() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "melody");
    }
}
