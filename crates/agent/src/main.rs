//! Payload logging agent
//!
//! # Usage
//!
//! ```bash
//! # Run the agent (default)
//! inflog-agent
//! inflog-agent --config configs/agent.toml
//!
//! # Explicit subcommand
//! inflog-agent serve --config configs/agent.toml
//! ```

mod ingest;
mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use inflog_config::{LogConfig, LogFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Payload logging agent
#[derive(Parser, Debug)]
#[command(name = "inflog-agent")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, default_value = "configs/agent.toml", global = true)]
    config: std::path::PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the logging agent
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve) | None => serve::run(&cli.config, cli.log_level.as_deref()).await,
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(config: &LogConfig, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or_else(|| config.level.as_str());
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
    Ok(())
}
