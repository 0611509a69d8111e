//! rebazer CLI

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "rebazer")]
#[command(about = "Keep green pull requests rebased and merge them once approved")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $REBAZER_CONFIG, then the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list the repositories it covers
    CheckConfig,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "rebazer=debug" } else { "rebazer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::CheckConfig) => cli::run_check_config(cli.config.as_deref()),
        None => cli::run_poller(cli.config.as_deref(), cli.once).await,
    }
}
