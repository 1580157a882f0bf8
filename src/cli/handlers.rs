//! Subcommand handlers; each returns the process exit code

use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cli::commands::{ChatArgs, ToolArgs};
use crate::config::MelodyConfig;
use crate::plot::list_plots;
use crate::session::AssistantSession;
use crate::tools::{ToolCatalog, ToolSystem};

const PROMPT: &str = "You: ";

pub async fn handle_chat(args: &ChatArgs, quiet: bool) -> i32 {
    match run_chat(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Chat session failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub fn handle_tool(args: &ToolArgs) -> i32 {
    let mut tools = match open_tools() {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    match tools.execute(&args.name, args.args.clone()) {
        Ok(result) => match print_json(&result) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

pub fn handle_tools() -> i32 {
    let catalog = ToolCatalog::new(MelodyConfig::default().plot_settings());
    for tool in catalog.tools() {
        println!("{:<30} {}", tool.name(), tool.description());
    }
    0
}

pub fn handle_plots() -> i32 {
    let settings = MelodyConfig::default().plot_settings();
    match list_plots(&settings) {
        Ok(urls) if urls.is_empty() => {
            println!("No plots in {}", settings.dir.display());
            0
        }
        Ok(urls) => {
            for url in urls {
                println!("{}", url);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn run_chat(args: &ChatArgs, quiet: bool) -> Result<()> {
    let config = chat_config(args)?;
    debug!("{}", config);

    let client = config
        .create_client()
        .context("Failed to create LLM client")?;
    let tools = config
        .open_tool_system()
        .context("Failed to open registry")?;
    let mut session = AssistantSession::new(client, tools, config.session_options());

    info!(
        provider = config.provider.as_str(),
        model = %config.model,
        "Chat session started"
    );

    if !quiet {
        print_banner(&config, &session);
    }

    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let input = line.trim();
                if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                    break;
                }
                if input.is_empty() {
                    continue;
                }
                record_history(&mut rl, input);

                let reply = session.handle_message(input).await;
                println!("Melody: {}\n", reply);
            }
            Err(ReadlineError::Interrupted) => {
                println!("(type 'exit' or press Ctrl-D to leave)");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Readline error: {}", e);
                return Err(anyhow!("Failed to read input: {}", e));
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Adds a line to the editor history; returns whether it was recorded
fn record_history(rl: &mut DefaultEditor, input: &str) -> bool {
    match rl.add_history_entry(input) {
        Ok(added) => added,
        Err(e) => {
            debug!("Failed to record history entry: {}", e);
            false
        }
    }
}

fn chat_config(args: &ChatArgs) -> Result<MelodyConfig> {
    let mut config = MelodyConfig::from_env().context("Invalid configuration")?;
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_tools() -> Result<ToolSystem> {
    let config = MelodyConfig::from_env().context("Invalid configuration")?;
    config
        .open_tool_system()
        .context("Failed to open registry")
}

fn print_banner(config: &MelodyConfig, session: &AssistantSession) {
    let registry = session.tools().registry();
    println!("Melody data science assistant ({})", session.client_name());
    println!(
        "{} dataset(s) and {} model(s) loaded from {}",
        registry.dataset_count(),
        registry.model_count(),
        config.state_file.display()
    );
    println!("Enter a .csv or .tsv path to load it, or ask a question. Type 'exit' to quit.\n");
}

fn print_json(value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render result")?;
    println!("{}", rendered);
    Ok(())
}
