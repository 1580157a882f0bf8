use clap::{Parser, Subcommand};
use genai::adapter::AdapterKind;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(
    name = "melody",
    about = "Data-science chat assistant backed by an LLM with dataset, regression and plotting tools",
    version,
    long_about = "melody lets you chat with an LLM that can load CSV datasets, summarise them, \
                  fit linear regressions, make predictions and draw plots. Datasets and models \
                  persist between sessions."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged and the banner is hidden"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Start an interactive chat session",
        long_about = "Starts a chat with the assistant. Enter a path ending in .csv or .tsv to \
                      load it directly as the active dataset; type 'exit' or 'quit' (or press \
                      Ctrl-D) to leave.\n\n\
                      Examples:\n  \
                      melody chat\n  \
                      melody chat --provider openai --model gpt-4o-mini"
    )]
    Chat(ChatArgs),

    #[command(
        about = "Run a single tool against the persistent registry",
        long_about = "Runs one tool without involving the LLM and prints its JSON result.\n\n\
                      Examples:\n  \
                      melody tool load_csv --args '{\"file_path\": \"data.csv\"}'\n  \
                      melody tool list_models"
    )]
    Tool(ToolArgs),

    #[command(about = "List the available tools")]
    Tools,

    #[command(about = "List the URLs of generated plot images")]
    Plots,
}

#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "LLM provider (overrides MELODY_PROVIDER)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name (overrides MELODY_MODEL)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Request timeout in seconds (overrides MELODY_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct ToolArgs {
    #[arg(value_name = "NAME", help = "Tool name, see 'melody tools'")]
    pub name: String,

    #[arg(
        short = 'a',
        long,
        value_name = "JSON",
        default_value = "{}",
        value_parser = parse_json_args,
        help = "Tool arguments as a JSON object"
    )]
    pub args: Value,
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    AdapterKind::from_lower_str(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "Invalid provider: {}. Valid options: gemini, openai, anthropic, ollama, groq, xai",
            s
        )
    })
}

fn parse_json_args(s: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(s).map_err(|e| format!("Invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("Tool arguments must be a JSON object".to_string());
    }
    Ok(value)
}
