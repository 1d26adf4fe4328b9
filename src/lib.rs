//! Crawl Launcher Library
//!
//! Core of the `crawl-launcher` binary: checks the interpreter, installs the
//! crawler's dependencies, runs the external crawler program, and reports the
//! outcome through console messages and an exit code.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod launch_state;
pub mod launcher;
pub mod pause;
pub mod process_guard;
pub mod step_args;
pub mod step_runner;
pub mod workspace;

// Re-export main types for convenience
pub use config::{ExitPolicy, LauncherConfig};
pub use console::Console;
pub use error::LauncherError;
pub use launch_state::{LaunchContext, LaunchStage, LaunchTransitionError};
pub use launcher::{CrawlerOutcome, DependencyOutcome, InterpreterCheck, LaunchReport, Launcher};
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use step_args::{CrawlerArgs, PipInstallArgs, StepArgs, VersionQueryArgs};
pub use step_runner::{OutputMode, StepOutput, StepRunner, SystemRunner};
pub use workspace::{OutputSnapshot, RunSummary, WorkspaceCheck};
