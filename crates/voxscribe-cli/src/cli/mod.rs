//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxscribe_core::config;

mod commands;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "voxscribe")]
#[command(version)]
#[command(about = "Telegram bot that transcribes voice messages and audio files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the bot with long polling (also serves a liveness page)
    Bot,
    /// Serve the webhook endpoint for Telegram to push updates to
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Register the configured webhook URL with Telegram
    SetWebhook,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Bot => commands::bot::polling(&load_config()?).await,
        Commands::Serve { port } => commands::bot::serve(&load_config()?, port).await,
        Commands::SetWebhook => commands::bot::set_webhook(&load_config()?).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

fn load_config() -> Result<config::Config> {
    config::Config::load().context("load config")
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
