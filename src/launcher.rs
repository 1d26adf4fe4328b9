//! The launch pipeline.
//!
//! Four steps run strictly in order, each exactly once:
//!
//! 1. interpreter version query (fatal on failure)
//! 2. dependency installation (warning on failure)
//! 3. crawler run
//! 4. result report
//!
//! Each step's outcome is captured into a typed value right after the
//! command returns, and the `LaunchContext` state machine guarantees the
//! order. Only the interpreter check may abort the launch.

use crate::config::{ExitPolicy, LauncherConfig};
use crate::console::Console;
use crate::error::Result;
use crate::launch_state::{LaunchContext, LaunchStage};
use crate::step_args::{CrawlerArgs, PipInstallArgs, StepArgs, VersionQueryArgs};
use crate::step_runner::{OutputMode, StepRunner};
use crate::workspace::{self, OutputSnapshot, RunSummary};
use std::io::Write;

/// Exit code used when the interpreter is missing
pub const EXIT_INTERPRETER_MISSING: i32 = 1;

/// Outcome of step 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterCheck {
    Found { version: String },
    /// The interpreter could not be started (not on PATH)
    Missing { reason: String },
    /// The interpreter started but the version query failed
    Failed { reason: String },
}

impl InterpreterCheck {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Outcome of step 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOutcome {
    Installed,
    /// `exit_code` is None when pip could not be started or was killed
    Failed { exit_code: Option<i32> },
    /// Dry run
    Skipped,
}

/// Outcome of step 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerOutcome {
    Succeeded,
    /// `exit_code` is None when the crawler could not be started or was killed
    Failed { exit_code: Option<i32> },
    /// Dry run
    Skipped,
}

/// Everything a launch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub interpreter: InterpreterCheck,
    /// None when the launch aborted before step 2
    pub dependencies: Option<DependencyOutcome>,
    /// None when the launch aborted before step 3
    pub crawler: Option<CrawlerOutcome>,
    /// Changes to the crawler's output files after a successful run
    pub summary: Option<RunSummary>,
    pub final_stage: LaunchStage,
    pub exit_code: i32,
}

impl LaunchReport {
    pub fn is_aborted(&self) -> bool {
        self.final_stage == LaunchStage::Aborted
    }
}

/// Final exit code of a completed launch
pub fn exit_code_for(policy: ExitPolicy, crawler: CrawlerOutcome) -> i32 {
    match (policy, crawler) {
        (ExitPolicy::Legacy, _) => 0,
        (ExitPolicy::Propagate, CrawlerOutcome::Succeeded | CrawlerOutcome::Skipped) => 0,
        (ExitPolicy::Propagate, CrawlerOutcome::Failed { exit_code }) => match exit_code {
            Some(code) if code != 0 => code,
            _ => 1,
        },
    }
}

/// Runs the pipeline against a `StepRunner`, writing feedback to a console.
pub struct Launcher<'a, R: StepRunner, W: Write> {
    config: &'a LauncherConfig,
    runner: R,
    console: Console<W>,
    ctx: LaunchContext,
}

impl<'a, R: StepRunner, W: Write> Launcher<'a, R, W> {
    pub fn new(config: &'a LauncherConfig, runner: R, console: Console<W>) -> Self {
        Self {
            config,
            runner,
            console,
            ctx: LaunchContext::new(),
        }
    }

    /// Stages entered so far
    pub fn history(&self) -> &[LaunchStage] {
        self.ctx.history()
    }

    /// Run all steps. Step failures are part of the report and console
    /// output is best-effort; `Err` means the stage machine was misused.
    pub fn run(&mut self) -> Result<LaunchReport> {
        self.ctx.transition_to(LaunchStage::CheckingInterpreter)?;
        let interpreter = self.check_interpreter();

        if !interpreter.is_found() {
            self.ctx.abort()?;
            return Ok(LaunchReport {
                interpreter,
                dependencies: None,
                crawler: None,
                summary: None,
                final_stage: self.ctx.current_stage(),
                exit_code: EXIT_INTERPRETER_MISSING,
            });
        }

        self.ctx.transition_to(LaunchStage::InstallingDependencies)?;
        let dependencies = self.install_dependencies();

        self.ctx.transition_to(LaunchStage::RunningCrawler)?;
        let (crawler, summary) = self.run_crawler();

        self.ctx.transition_to(LaunchStage::Reporting)?;
        self.report(crawler, summary.as_ref());

        self.ctx.transition_to(LaunchStage::Completed)?;

        Ok(LaunchReport {
            interpreter,
            dependencies: Some(dependencies),
            crawler: Some(crawler),
            summary,
            final_stage: self.ctx.current_stage(),
            exit_code: exit_code_for(self.config.exit_policy, crawler),
        })
    }

    fn check_interpreter(&mut self) -> InterpreterCheck {
        let args = VersionQueryArgs {
            interpreter: self.config.interpreter.clone(),
        };

        let check = match self.runner.run(&args, OutputMode::Captured) {
            Ok(output) if output.success => {
                let version = output
                    .first_line()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} (version unknown)", self.config.interpreter));
                InterpreterCheck::Found { version }
            }
            Ok(output) => InterpreterCheck::Failed {
                reason: format!(
                    "`{}` exited with code {}",
                    args.display_command(),
                    output.exit_code.unwrap_or(-1)
                ),
            },
            Err(e) if e.is_not_found() => InterpreterCheck::Missing {
                reason: e.to_string(),
            },
            Err(e) => InterpreterCheck::Failed {
                reason: e.to_string(),
            },
        };

        let interpreter = &self.config.interpreter;
        match &check {
            InterpreterCheck::Found { version } => self.console.interpreter_version(version),
            InterpreterCheck::Missing { reason } => {
                tracing::error!(%interpreter, %reason, "interpreter not found");
                self.console.interpreter_missing(interpreter);
            }
            InterpreterCheck::Failed { reason } => {
                tracing::error!(%interpreter, %reason, "interpreter version query failed");
                self.console.interpreter_check_failed(interpreter, reason);
            }
        }

        check
    }

    fn install_dependencies(&mut self) -> DependencyOutcome {
        let args = PipInstallArgs {
            interpreter: self.config.interpreter.clone(),
            packages: self.config.packages.clone(),
        };

        if self.config.dry_run {
            self.console.dry_run(&args.display_command());
            return DependencyOutcome::Skipped;
        }

        self.console.installing_dependencies(&self.config.packages);

        let outcome = match self.runner.run(&args, OutputMode::Inherited) {
            Ok(output) if output.success => DependencyOutcome::Installed,
            Ok(output) => DependencyOutcome::Failed {
                exit_code: output.exit_code,
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not start dependency installation");
                DependencyOutcome::Failed { exit_code: None }
            }
        };

        if let DependencyOutcome::Failed { exit_code } = outcome {
            tracing::warn!(?exit_code, "dependency installation failed, continuing");
            self.console.dependency_install_failed();
        }

        outcome
    }

    fn run_crawler(&mut self) -> (CrawlerOutcome, Option<RunSummary>) {
        let check = workspace::inspect(self.config);
        if !check.crawler_present {
            self.console.crawler_file_missing(&self.config.crawler);
        }
        if !check.crawler_config_present {
            self.console.crawler_config_missing(&self.config.crawler_config);
        }

        let args = CrawlerArgs {
            interpreter: self.config.interpreter.clone(),
            crawler: self.config.crawler.clone(),
            working_dir: self.config.working_dir.clone(),
        };

        if self.config.dry_run {
            self.console.dry_run(&args.display_command());
            return (CrawlerOutcome::Skipped, None);
        }

        let before = OutputSnapshot::capture(self.config);
        self.console.starting_crawler(&self.config.crawler);

        let outcome = match self.runner.run(&args, OutputMode::Inherited) {
            Ok(output) if output.success => CrawlerOutcome::Succeeded,
            Ok(output) => CrawlerOutcome::Failed {
                exit_code: output.exit_code,
            },
            Err(e) => {
                tracing::error!(error = %e, "could not start crawler");
                CrawlerOutcome::Failed { exit_code: None }
            }
        };

        let summary = match outcome {
            CrawlerOutcome::Succeeded => {
                Some(before.summarize(&OutputSnapshot::capture(self.config)))
            }
            _ => None,
        };

        (outcome, summary)
    }

    fn report(&mut self, crawler: CrawlerOutcome, summary: Option<&RunSummary>) {
        match crawler {
            CrawlerOutcome::Failed { exit_code } => {
                tracing::error!(?exit_code, "crawler failed");
                self.console.crawler_failed();
            }
            CrawlerOutcome::Succeeded => {
                self.console.crawler_succeeded();
                if let Some(summary) = summary {
                    self.console.new_links(summary.new_links, &summary.links_file);
                    if summary.failed_feeds_logged {
                        let failed_log = self.config.in_crawler_dir(&self.config.failed_log);
                        self.console.failed_feeds_logged(&failed_log);
                    }
                }
            }
            CrawlerOutcome::Skipped => {}
        }
    }
}
