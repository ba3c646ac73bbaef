//! Courier Daemon - Outbound message delivery over a messaging gateway.

mod app;
mod gateway;
mod ingress;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier_config_and_utils::{init_logging, parse_level, Config, Paths};

/// Courier daemon command-line interface.
#[derive(Parser)]
#[command(name = "courier-daemon")]
#[command(about = "Queues outbound messages and delivers them through the messaging gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (config, logs). Defaults to ~/.courier
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon in the foreground
    Start,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    let level = parse_level(cli.log_level.as_deref().unwrap_or(&config.log_level));
    init_logging(level, paths.log_file())?;
    app::install_panic_hook();

    match cli.command {
        Some(Commands::Start) | None => app::run_daemon(config).await?,
    }

    Ok(())
}
