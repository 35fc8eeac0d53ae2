//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Context};
use robot_folders::defaults::default_settings_path;
use robot_folders::output::OutputConfig;

/// robot-folders - Reproducible multi-repository robotics workspaces
#[derive(Parser, Debug)]
#[command(name = "robot-folders")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Settings file
    #[arg(long, global = true, value_name = "PATH", env = "ROBOT_FOLDERS_SETTINGS")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a colcon workspace and clone its repositories
    Init(commands::init::InitArgs),

    /// Reconcile a directory of checkouts with a descriptor file
    Adapt(commands::adapt::AdaptArgs),

    /// Write the checkouts of a directory as a descriptor file
    Scrape(commands::scrape::ScrapeArgs),

    /// Show the checkouts of a directory with their remote and version
    Status(commands::status::StatusArgs),

    /// Build a colcon workspace
    Build(commands::build::BuildArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Installs the logger. `RUST_LOG`, when set, wins over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let ctx = Context {
            output: OutputConfig::from_env_and_flag(&self.color),
            settings_path: self.settings.unwrap_or_else(default_settings_path),
        };

        match self.command {
            Commands::Init(args) => commands::init::execute(args, &ctx),
            Commands::Adapt(args) => commands::adapt::execute(args, &ctx),
            Commands::Scrape(args) => commands::scrape::execute(args, &ctx),
            Commands::Status(args) => commands::status::execute(args, &ctx),
            Commands::Build(args) => commands::build::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
