use crate::config::{ExitPolicy, LauncherConfig};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Crawl Launcher - checks Python, installs the crawler's dependencies and runs it
///
/// Run without arguments to perform the standard launch.
#[derive(Parser, Debug)]
#[command(name = "crawl-launcher")]
#[command(about = "Checks the Python interpreter, installs dependencies and runs the RSS crawler")]
#[command(version)]
pub struct Cli {
    /// Launcher configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interpreter to check and run the crawler with
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Crawler program file
    #[arg(long)]
    pub crawler: Option<PathBuf>,

    /// Package to install (repeatable; replaces the configured list)
    #[arg(short = 'p', long = "package")]
    pub packages: Vec<String>,

    /// Directory to run the crawler in
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// How the final exit code is chosen (propagate, legacy)
    #[arg(long)]
    pub exit_policy: Option<ExitPolicy>,

    /// Do not wait for a keypress before exiting
    #[arg(long)]
    pub no_pause: bool,

    /// Dry-run mode: check the interpreter, print the remaining commands
    /// without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a launcher configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the effective configuration: file (or defaults), then flags.
    pub fn resolve_config(&self) -> Result<LauncherConfig> {
        let mut config = match &self.config {
            Some(path) => LauncherConfig::load_from_file(path)?,
            None => LauncherConfig::default(),
        };

        if let Some(interpreter) = &self.interpreter {
            config.interpreter = interpreter.clone();
        }
        if let Some(crawler) = &self.crawler {
            config.crawler = crawler.clone();
        }
        if !self.packages.is_empty() {
            config.packages = self.packages.clone();
        }
        if let Some(workdir) = &self.workdir {
            config.working_dir = Some(workdir.clone());
        }
        if let Some(policy) = self.exit_policy {
            config.exit_policy = policy;
        }
        if self.no_pause {
            config.pause = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }

        config.validate().context("Invalid launcher configuration")?;
        Ok(config)
    }
}
