//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modcache - offline module cache for node_modules
///
/// Packs installed dependencies into versioned archives under .modules and
/// restores them without touching the network.
#[derive(Parser, Debug)]
#[command(name = "modcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MODCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .modcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Project root (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Only process dependencies, skip devDependencies (also NODE_ENV=production)
    #[arg(long, global = true)]
    pub production: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore node_modules from the module cache
    Install,

    /// Refresh the module cache from node_modules
    Pack(PackArgs),

    /// List cached archives
    List(ListArgs),
}

/// Arguments for the pack command
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Pack only this declared module
    pub module: Option<String>,

    /// Show the reconciliation plan without changing the cache
    #[arg(long, conflicts_with = "module")]
    pub dry_run: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Diagnostic log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
