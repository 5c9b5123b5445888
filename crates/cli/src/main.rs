//! Rentier CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP gateway
//! - `ask`     — One-shot advisor question from the terminal
//! - `config`  — Init / validate / show / locate the config file
//! - `doctor`  — Diagnose setup problems

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "rentier",
    about = "Rentier — streaming RAG advisor for real-estate investment accounting",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask the advisor a single question and stream the answer
    Ask {
        /// The question, in Japanese
        question: String,

        /// JSON file with transaction records to summarize into the context
        #[arg(short, long)]
        transactions: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup problems
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init,
    /// Validate the current configuration
    Validate,
    /// Print the resolved configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            question,
            transactions,
        } => commands::ask::run(question, transactions).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config_cmd::init().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
