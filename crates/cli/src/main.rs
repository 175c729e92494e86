//! CycleMate CLI, the main entry point.
//!
//! Commands:
//! - `serve`    Start the HTTP chat endpoint
//! - `ask`      Send one message and print the reply
//! - `preview`  Print the turn sequence a message would produce
//! - `init`     Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cyclemate",
    about = "CycleMate: a menstrual-health chat assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to ~/.cyclemate/config.toml)
    #[arg(short, long, global = true, env = "CYCLEMATE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat endpoint
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Requester display name
        #[arg(short, long)]
        name: Option<String>,

        /// JSON file with prior turns (`[{"role": "user", "content": "..."}]`)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show the turns that would be sent, without calling the provider
    Preview {
        /// The message to preview
        message: String,

        /// Requester display name
        #[arg(short, long)]
        name: Option<String>,

        /// JSON file with prior turns
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask {
            message,
            name,
            history,
        } => commands::ask::run(config_path, message, name, history.as_deref()).await?,
        Commands::Preview {
            message,
            name,
            history,
        } => commands::preview::run(config_path, message, name, history.as_deref())?,
        Commands::Init { force } => commands::init::run(config_path, force)?,
    }

    Ok(())
}
