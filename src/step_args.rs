//! Type-safe step command contracts.
//!
//! Each external command the launcher runs is described by a struct that
//! implements `StepArgs`, instead of an ad-hoc vector of strings. The struct
//! definition is the contract: the runner only ever sees the program, its
//! arguments, and the directory to run in.

use std::path::{Path, PathBuf};

/// Trait for typed step commands.
///
/// # Contract
///
/// - `program()`: executable resolved on PATH (or a path to one).
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `current_dir()`: directory to run in, `None` for the launcher's own.
pub trait StepArgs {
    fn program(&self) -> &str;

    fn to_cli_args(&self) -> Vec<String>;

    fn current_dir(&self) -> Option<&Path> {
        None
    }

    /// Command line as shown to the user (dry run, logs)
    fn display_command(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}

/// `<interpreter> --version`
#[derive(Debug, Clone)]
pub struct VersionQueryArgs {
    pub interpreter: String,
}

impl StepArgs for VersionQueryArgs {
    fn program(&self) -> &str {
        &self.interpreter
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["--version".to_string()]
    }
}

/// `<interpreter> -m pip install <packages>`
#[derive(Debug, Clone)]
pub struct PipInstallArgs {
    pub interpreter: String,
    pub packages: Vec<String>,
}

impl StepArgs for PipInstallArgs {
    fn program(&self) -> &str {
        &self.interpreter
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
        args.extend(self.packages.iter().cloned());
        args
    }
}

/// `<interpreter> <crawler>`, run without arguments in the crawler directory
#[derive(Debug, Clone)]
pub struct CrawlerArgs {
    pub interpreter: String,
    pub crawler: PathBuf,
    pub working_dir: Option<PathBuf>,
}

impl StepArgs for CrawlerArgs {
    fn program(&self) -> &str {
        &self.interpreter
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.crawler.to_string_lossy().into_owned()]
    }

    fn current_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}
