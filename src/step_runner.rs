//! Step execution
//!
//! Every external command goes through a `StepRunner`. The production
//! `SystemRunner` spawns the process in its own process group, registers it
//! with the global `ChildRegistry` while it runs, and returns the captured
//! exit status as a `StepOutput` for the pipeline to inspect.

use crate::error::{LauncherError, Result};
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use crate::step_args::StepArgs;
use std::process::{Command, Stdio};

/// Where a step's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collected into `StepOutput` and not shown
    Captured,
    /// Streamed straight to the launcher's console
    Inherited,
}

/// Result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// Captured stdout (empty in `Inherited` mode)
    pub stdout: String,
    /// Captured stderr (empty in `Inherited` mode)
    pub stderr: String,
    /// Exit code (None if terminated by signal)
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl StepOutput {
    /// Output of a process that exited with `code`
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            success: code == 0,
            ..Self::default()
        }
    }

    /// First non-empty line of stdout, falling back to stderr.
    ///
    /// Older interpreters print their version on stderr.
    pub fn first_line(&self) -> Option<&str> {
        [&self.stdout, &self.stderr]
            .into_iter()
            .flat_map(|text| text.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

/// Seam between the pipeline and the operating system.
pub trait StepRunner {
    /// Run `step` to completion.
    ///
    /// Returns `Err(LauncherError::Spawn { .. })` when the program could not
    /// be started; a program that starts and fails is an `Ok` output with
    /// `success == false`.
    fn run(&mut self, step: &dyn StepArgs, mode: OutputMode) -> Result<StepOutput>;
}

impl<R: StepRunner + ?Sized> StepRunner for &mut R {
    fn run(&mut self, step: &dyn StepArgs, mode: OutputMode) -> Result<StepOutput> {
        (**self).run(step, mode)
    }
}

/// Runs steps as real child processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl StepRunner for SystemRunner {
    fn run(&mut self, step: &dyn StepArgs, mode: OutputMode) -> Result<StepOutput> {
        let program = step.program();
        let cli_args = step.to_cli_args();

        tracing::info!(program, args = ?cli_args, ?mode, "running step");

        let mut cmd = Command::new(program);
        cmd.args(&cli_args)
            .stdin(Stdio::null())
            .in_new_process_group();

        if let Some(dir) = step.current_dir() {
            cmd.current_dir(dir);
        }

        match mode {
            OutputMode::Captured => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherited => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        let child = cmd.spawn().map_err(|e| LauncherError::spawn(program, e))?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let waited = child.wait_with_output();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let output = waited?;
        let exit_code = output.status.code();
        let success = output.status.success();

        if success {
            tracing::info!(program, "step succeeded");
        } else {
            tracing::info!(program, code = exit_code.unwrap_or(-1), "step failed");
        }

        Ok(StepOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            success,
        })
    }
}
