use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;

mod client;
mod config;
mod conversation;
mod ui;

use config::Config;

#[derive(Parser)]
#[command(name = "advisor")]
#[command(version)]
#[command(about = "Terminal chat client for a business-strategy answering service", long_about = None)]
struct Cli {
    /// Override the answering service base URL
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration and where it lives
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_init()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Some(Commands::Config) => {
            print_config(&config)?;
            Ok(())
        }
        None => {
            init_tracing()?;
            ui::run(config).await
        }
    }
}

fn print_config(config: &Config) -> Result<()> {
    println!("config file: {}", Config::config_path()?.display());
    println!("endpoint: {}", config.endpoint);
    println!("request_timeout_secs: {}", config.request_timeout_secs);
    println!("system_prompt: {}", config.system_prompt());
    Ok(())
}

/// Log to a file under `~/.advisor`; the TUI owns stderr.
fn init_tracing() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create .advisor directory")?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("advisor=info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
