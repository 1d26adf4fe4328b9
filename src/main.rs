//! Crawl Launcher - main entry point
//!
//! Checks the interpreter, installs the crawler's dependencies, runs the
//! crawler and reports the result.

use anyhow::Result;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crawl_launcher::cli::{Cli, Commands};
use crawl_launcher::config::LauncherConfig;
use crawl_launcher::console::{Console, PAUSE_PROMPT};
use crawl_launcher::launcher::Launcher;
use crawl_launcher::pause;
use crawl_launcher::process_guard::{self, ProcessGuard};
use crawl_launcher::step_runner::SystemRunner;

/// Initialize the tracing subscriber on stderr
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // RUST_LOG overrides the verbosity flag
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    info!("crawl-launcher starting up");

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("launcher failed: {:#}", e);
            eprintln!("✗ {:#}", e);
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    if let Some(Commands::Validate { config }) = &cli.command {
        return Ok(validate_config_file(config));
    }

    // Children are terminated if we receive SIGINT/SIGTERM/SIGHUP
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let config = cli.resolve_config()?;
    debug!(?config, "effective configuration");

    let report = {
        let _guard = ProcessGuard::new();
        let mut launcher = Launcher::new(&config, SystemRunner, Console::stdout());
        let report = launcher.run()?;
        debug!(history = ?launcher.history(), "launch stages");
        report
    };
    info!(stage = %report.final_stage, exit_code = report.exit_code, "launch finished");

    // A missing interpreter terminates immediately
    if !report.is_aborted() && pause::should_pause(config.pause) {
        if let Err(e) = pause::wait_for_keypress(PAUSE_PROMPT) {
            warn!("Pause prompt failed: {}", e);
        }
    }

    Ok(report.exit_code)
}

fn validate_config_file(path: &std::path::Path) -> i32 {
    info!("Validating configuration file: {:?}", path);
    match LauncherConfig::load_from_file(path).and_then(|config| config.validate()) {
        Ok(()) => {
            println!("✓ Configuration file is valid: {}", path.display());
            0
        }
        Err(e) => {
            error!("Configuration validation failed: {:#}", e);
            eprintln!("✗ Configuration validation failed: {:#}", e);
            1
        }
    }
}
