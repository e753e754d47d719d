//! modcache - offline module cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use modcache::cli::args::LogFormat;
use modcache::cli::{Cli, Commands};
use modcache::config::{ConfigManager, Settings};
use modcache::error::{ModcacheError, ModcacheResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ModcacheResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("modcache=warn"),
        1 => EnvFilter::new("modcache=info"),
        _ => EnvFilter::new("modcache=debug"),
    };

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let cwd = match cli.cwd {
        Some(ref path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| ModcacheError::io("getting current directory", e))?,
    };

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    let node_env = std::env::var("NODE_ENV").ok();
    let settings = Settings::resolve(&config, cwd, cli.production, node_env.as_deref());
    debug!("Resolved settings: {:?}", settings);

    // Dispatch to command
    match cli.command {
        Commands::Install => modcache::cli::commands::install(&settings).await,
        Commands::Pack(args) => modcache::cli::commands::pack(args, &settings).await,
        Commands::List(args) => modcache::cli::commands::list(args, &settings).await,
    }
}
