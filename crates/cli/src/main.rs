//! codecrew CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Talk to the single autonomous agent
//! - `lead`   — Talk to the tech lead, who delegates to workers
//! - `status` — Show the project progress record

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod operator;

#[derive(Parser)]
#[command(
    name = "codecrew",
    about = "codecrew — an autonomous coding agency in your terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root the agents operate in
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the autonomous coding agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Chat with the tech lead (plans, delegates to workers)
    Lead,

    /// Show the project progress record
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let workspace = cli.workspace.canonicalize()?;

    match cli.command {
        Commands::Chat { message } => commands::chat::run(&workspace, message).await?,
        Commands::Lead => commands::lead::run(&workspace).await?,
        Commands::Status => commands::status::run(&workspace)?,
    }

    Ok(())
}
