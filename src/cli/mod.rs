pub mod commands;
pub mod handlers;

pub use commands::{ChatArgs, CliArgs, Commands, ToolArgs};
pub use handlers::{handle_chat, handle_plots, handle_tool, handle_tools};
