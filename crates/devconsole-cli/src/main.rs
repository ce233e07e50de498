//! Devconsole - Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devconsole_cli::commands::{clear, config, snapshot, tail};
use devconsole_cli::{ClientContext, Formatter, OutputFormat};
use devconsole_logging::{debug, init, init_with_file, LogConfig, WorkerGuard};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devconsole", version, about = "Live debug console for a running server")]
struct Cli {
    /// Config file (defaults to $DEVCONSOLE_CONFIG, then ./devconsole.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Server base URL, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    debug: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a panel and print rows as they arrive
    Tail(tail::TailArgs),
    /// Fetch and print the current snapshot
    Snapshot(snapshot::SnapshotArgs),
    /// Clear a panel (or every panel) on the server
    Clear(clear::ClearArgs),
    /// Show the effective configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = ClientContext::load(cli.config.as_deref(), cli.base_url.clone())?;
    let _guard = init_logging(&ctx, cli.debug)?;
    debug!(
        "Config path: {} (from {})",
        ctx.config_path.display(),
        ctx.config_source
    );

    let formatter = Formatter::new(cli.format, ctx.config.console.slow_query_ms);
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Tail(args) => tail::run(&ctx, args, &formatter).await,
        Commands::Snapshot(args) => snapshot::run(&ctx, args, &formatter, &mut stdout).await,
        Commands::Clear(args) => clear::run(&ctx, args, &mut stdout).await,
        Commands::Config(args) => config::run(&ctx, args, &mut stdout),
    }
}

/// Logs go to stderr (stdout carries panel output) or to daily files
fn init_logging(ctx: &ClientContext, debug: bool) -> Result<Option<WorkerGuard>> {
    let section = &ctx.config.logging;
    let log_config = LogConfig::from_section(section).debug(debug);

    match &section.directory {
        Some(dir) => {
            let guard = init_with_file(log_config, dir, "devconsole.log")
                .with_context(|| format!("Failed to set up logging in {}", dir.display()))?;
            Ok(Some(guard))
        }
        None => {
            init(log_config);
            Ok(None)
        }
    }
}
