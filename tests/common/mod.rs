//! Shared test infrastructure for integration tests.

#![allow(dead_code)]

use crawl_launcher::console::Console;
use crawl_launcher::error::{LauncherError, Result};
use crawl_launcher::launcher::{LaunchReport, Launcher};
use crawl_launcher::step_args::StepArgs;
use crawl_launcher::step_runner::{OutputMode, StepOutput, StepRunner};
use crawl_launcher::LauncherConfig;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub mode: OutputMode,
}

/// Which step an invocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Version,
    Install,
    Crawler,
}

impl Call {
    pub fn kind(&self) -> StepKind {
        match self.args.first().map(String::as_str) {
            Some("--version") => StepKind::Version,
            Some("-m") => StepKind::Install,
            _ => StepKind::Crawler,
        }
    }
}

/// Scripted stand-in for the operating system.
///
/// `None` for a step means the program cannot be started at all.
#[derive(Debug, Clone)]
pub struct FakeRunner {
    pub version: Option<StepOutput>,
    pub install: Option<StepOutput>,
    pub crawler: Option<StepOutput>,
    pub calls: Vec<Call>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self {
            version: Some(StepOutput {
                stdout: "Python 3.12.1\n".to_string(),
                ..StepOutput::exited(0)
            }),
            install: Some(StepOutput::exited(0)),
            crawler: Some(StepOutput::exited(0)),
            calls: Vec::new(),
        }
    }
}

impl FakeRunner {
    pub fn without_interpreter() -> Self {
        Self {
            version: None,
            install: None,
            crawler: None,
            ..Self::default()
        }
    }

    pub fn with_install_code(mut self, code: i32) -> Self {
        self.install = Some(StepOutput::exited(code));
        self
    }

    pub fn with_crawler_code(mut self, code: i32) -> Self {
        self.crawler = Some(StepOutput::exited(code));
        self
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.calls.iter().map(Call::kind).collect()
    }
}

impl StepRunner for FakeRunner {
    fn run(&mut self, step: &dyn StepArgs, mode: OutputMode) -> Result<StepOutput> {
        let call = Call {
            program: step.program().to_string(),
            args: step.to_cli_args(),
            mode,
        };
        let scripted = match call.kind() {
            StepKind::Version => self.version.clone(),
            StepKind::Install => self.install.clone(),
            StepKind::Crawler => self.crawler.clone(),
        };
        self.calls.push(call);

        scripted.ok_or_else(|| {
            LauncherError::spawn(
                step.program(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            )
        })
    }
}

/// Run a launch against `runner`, returning the report and console text
pub fn launch(config: &LauncherConfig, runner: &mut FakeRunner) -> (LaunchReport, String) {
    let mut out = Vec::new();
    let report = {
        let mut launcher = Launcher::new(config, &mut *runner, Console::new(&mut out));
        launcher.run().expect("launch should not error")
    };
    (report, String::from_utf8(out).expect("console output is UTF-8"))
}

/// Configuration rooted in `dir`, without the final pause
pub fn config_in(dir: &std::path::Path) -> LauncherConfig {
    LauncherConfig {
        working_dir: Some(dir.to_path_buf()),
        pause: false,
        ..LauncherConfig::default()
    }
}
