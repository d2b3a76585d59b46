//! AutoMind - a minimal tool-using agent

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{actions_command, ask_command, init_command, status_command, think_command};

/// AutoMind - let a model pick and run tools for you
#[derive(Parser)]
#[command(name = "automind")]
#[command(about = "◆ A minimal tool-using agent runtime")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config file
    Init,
    /// Single-shot run: one model call, one tool call
    Ask {
        /// Question to answer
        question: String,
        /// Summarize the tool response with a second model call
        #[arg(short, long)]
        summarize: bool,
        /// Override the configured backstory
        #[arg(short, long)]
        backstory: Option<String>,
    },
    /// Iterative run: think, act, observe
    Think {
        /// Question to answer
        question: String,
        /// Number of think/act/observe cycles
        #[arg(short = 'n', long)]
        iterations: Option<u32>,
        /// Override the configured backstory
        #[arg(short, long)]
        backstory: Option<String>,
        /// Print the reasoning trace
        #[arg(short, long)]
        trace: bool,
    },
    /// List registered actions and their schemas
    Actions,
    /// Show config and backend status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init => init_command().await,
        Commands::Ask {
            question,
            summarize,
            backstory,
        } => ask_command(question, summarize, backstory).await,
        Commands::Think {
            question,
            iterations,
            backstory,
            trace,
        } => think_command(question, iterations, backstory, trace).await,
        Commands::Actions => actions_command().await,
        Commands::Status => status_command().await,
    };

    if let Err(e) = result {
        commands::report_failure(&e);
        std::process::exit(1);
    }
}
