use melody::cli::commands::{CliArgs, Commands};
use melody::cli::handlers::{handle_chat, handle_plots, handle_tool, handle_tools};
use melody::util::logging;
use melody::{NAME, VERSION};

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    // a missing .env is not an error
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Chat(chat_args) => handle_chat(chat_args, args.quiet).await,
        Commands::Tool(tool_args) => handle_tool(tool_args),
        Commands::Tools => handle_tools(),
        Commands::Plots => handle_plots(),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = logging::parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
