//! Tests for the launch pipeline
//!
//! These tests drive `Launcher` with a scripted `FakeRunner` and verify:
//! - The fatal interpreter path
//! - Non-fatal dependency and crawler failures
//! - Step ordering and exactly-once execution
//! - Exit policy and dry-run behavior

mod common;

use common::{config_in, launch, FakeRunner, StepKind};
use crawl_launcher::launcher::{CrawlerOutcome, DependencyOutcome, InterpreterCheck};
use crawl_launcher::step_runner::{OutputMode, StepOutput};
use crawl_launcher::{ExitPolicy, LaunchStage};

const SUCCESS_MSG: &str = "Crawler finished successfully";
const FAILURE_MSG: &str = "did not finish successfully";
const MISSING_MSG: &str = "was not found";
const VERSION_FAILED_MSG: &str = "could not report its version";
const PRIVILEGES_MSG: &str = "administrator privileges";

// =============================================================================
// Interpreter check
// =============================================================================

#[test]
fn test_missing_interpreter_aborts_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::without_interpreter();

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(report.exit_code, 1);
    assert!(report.is_aborted());
    assert_eq!(report.final_stage, LaunchStage::Aborted);
    assert!(matches!(report.interpreter, InterpreterCheck::Missing { .. }));
    assert!(report.dependencies.is_none());
    assert!(report.crawler.is_none());
    assert!(out.contains(MISSING_MSG));
    assert_eq!(runner.kinds(), vec![StepKind::Version]);
}

#[test]
fn test_failing_version_query_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner {
        version: Some(StepOutput::exited(9009)),
        ..FakeRunner::default()
    };

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(report.exit_code, 1);
    assert!(report.is_aborted());
    assert!(matches!(
        &report.interpreter,
        InterpreterCheck::Failed { reason } if reason.contains("9009")
    ));
    assert!(out.contains(VERSION_FAILED_MSG));
    assert!(out.contains("exited with code 9009"));
    assert!(!out.contains(MISSING_MSG));
    assert!(!out.contains(SUCCESS_MSG));
    assert!(!out.contains(FAILURE_MSG));
    assert_eq!(runner.kinds(), vec![StepKind::Version]);
}

#[test]
fn test_version_printed_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(
        report.interpreter,
        InterpreterCheck::Found {
            version: "Python 3.12.1".to_string()
        }
    );
    assert_eq!(out.matches("Python 3.12.1").count(), 1);
}

#[test]
fn test_version_on_stderr_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner {
        version: Some(StepOutput {
            stderr: "Python 2.7.18\n".to_string(),
            ..StepOutput::exited(0)
        }),
        ..FakeRunner::default()
    };

    let (_, out) = launch(&config_in(dir.path()), &mut runner);
    assert_eq!(out.matches("Python 2.7.18").count(), 1);
}

#[test]
fn test_version_output_is_captured() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();
    launch(&config_in(dir.path()), &mut runner);

    assert_eq!(runner.calls[0].mode, OutputMode::Captured);
    assert_eq!(runner.calls[1].mode, OutputMode::Inherited);
    assert_eq!(runner.calls[2].mode, OutputMode::Inherited);
}

// =============================================================================
// Dependency installation
// =============================================================================

#[test]
fn test_install_uses_interpreter_pip() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();
    launch(&config_in(dir.path()), &mut runner);

    let install = &runner.calls[1];
    assert_eq!(install.program, "python3");
    assert_eq!(
        install.args,
        vec!["-m", "pip", "install", "feedparser", "requests"]
    );
}

#[test]
fn test_install_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default().with_install_code(1);

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(
        report.dependencies,
        Some(DependencyOutcome::Failed { exit_code: Some(1) })
    );
    assert!(out.contains(PRIVILEGES_MSG));
    assert_eq!(
        runner.kinds(),
        vec![StepKind::Version, StepKind::Install, StepKind::Crawler]
    );
    assert_eq!(report.final_stage, LaunchStage::Completed);
    assert_eq!(report.exit_code, 0);
}

#[test]
fn test_unstartable_pip_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner {
        install: None,
        ..FakeRunner::default()
    };

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(
        report.dependencies,
        Some(DependencyOutcome::Failed { exit_code: None })
    );
    assert!(out.contains(PRIVILEGES_MSG));
    assert_eq!(report.crawler, Some(CrawlerOutcome::Succeeded));
}

// =============================================================================
// Crawler and reporting
// =============================================================================

#[test]
fn test_crawler_success_message() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(report.crawler, Some(CrawlerOutcome::Succeeded));
    assert!(out.contains(SUCCESS_MSG));
    assert!(!out.contains(FAILURE_MSG));
    assert_eq!(report.exit_code, 0);
}

#[test]
fn test_crawler_failure_message_and_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default().with_crawler_code(2);

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(
        report.crawler,
        Some(CrawlerOutcome::Failed { exit_code: Some(2) })
    );
    assert!(out.contains(FAILURE_MSG));
    assert!(!out.contains(SUCCESS_MSG));
    assert_eq!(report.exit_code, 2);
    assert_eq!(report.final_stage, LaunchStage::Completed);
}

#[test]
fn test_crawler_killed_by_signal_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner {
        crawler: Some(StepOutput {
            exit_code: None,
            success: false,
            ..StepOutput::default()
        }),
        ..FakeRunner::default()
    };

    let (report, out) = launch(&config_in(dir.path()), &mut runner);
    assert_eq!(report.exit_code, 1);
    assert!(out.contains(FAILURE_MSG));
}

#[test]
fn test_legacy_policy_ignores_crawler_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = crawl_launcher::LauncherConfig {
        exit_policy: ExitPolicy::Legacy,
        ..config_in(dir.path())
    };
    let mut runner = FakeRunner::default().with_crawler_code(3);

    let (report, out) = launch(&config, &mut runner);
    assert_eq!(report.exit_code, 0);
    assert!(out.contains(FAILURE_MSG));
}

#[test]
fn test_crawler_runs_without_arguments_in_workdir() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();
    launch(&config_in(dir.path()), &mut runner);

    let crawler = &runner.calls[2];
    assert_eq!(crawler.program, "python3");
    assert_eq!(crawler.args, vec!["rss_crawler.py"]);
}

#[test]
fn test_report_names_crawler_configured_links_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "output_file": "netdisk_links.txt" }"#,
    )
    .unwrap();
    let mut runner = FakeRunner::default();

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    let summary = report.summary.expect("successful run has a summary");
    assert_eq!(summary.links_file, dir.path().join("netdisk_links.txt"));
    assert!(out.contains("netdisk_links.txt"));
    assert!(!out.contains("all_links.txt"));
}

#[test]
fn test_missing_workspace_files_warn_but_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();

    let (report, out) = launch(&config_in(dir.path()), &mut runner);

    assert!(out.contains("rss_crawler.py not found"));
    assert!(out.contains("config.json not found"));
    assert_eq!(report.crawler, Some(CrawlerOutcome::Succeeded));
}

#[test]
fn test_present_workspace_files_do_not_warn() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("rss_crawler.py"), "").unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();
    let mut runner = FakeRunner::default();

    let (_, out) = launch(&config_in(dir.path()), &mut runner);
    assert!(!out.contains("WARNING"));
}

// =============================================================================
// Ordering and idempotence
// =============================================================================

#[test]
fn test_steps_run_in_order_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = FakeRunner::default();

    let (report, _) = launch(&config_in(dir.path()), &mut runner);

    assert_eq!(
        runner.kinds(),
        vec![StepKind::Version, StepKind::Install, StepKind::Crawler]
    );
    assert_eq!(report.final_stage, LaunchStage::Completed);
}

#[test]
fn test_rerun_repeats_same_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut first = FakeRunner::default().with_install_code(1);
    let mut second = FakeRunner::default().with_install_code(1);
    let (first_report, first_out) = launch(&config, &mut first);
    let (second_report, second_out) = launch(&config, &mut second);

    assert_eq!(first.calls, second.calls);
    assert_eq!(first_report, second_report);
    assert_eq!(first_out, second_out);
}

#[test]
fn test_launcher_history_follows_stage_machine() {
    use crawl_launcher::console::Console;
    use crawl_launcher::launcher::Launcher;

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut runner = FakeRunner::default();
    let mut out = Vec::new();

    let mut launcher = Launcher::new(&config, &mut runner, Console::new(&mut out));
    launcher.run().unwrap();

    assert_eq!(
        launcher.history(),
        &[
            LaunchStage::CheckingInterpreter,
            LaunchStage::InstallingDependencies,
            LaunchStage::RunningCrawler,
            LaunchStage::Reporting,
            LaunchStage::Completed,
        ]
    );
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_only_checks_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    let config = crawl_launcher::LauncherConfig {
        dry_run: true,
        ..config_in(dir.path())
    };
    let mut runner = FakeRunner::default();

    let (report, out) = launch(&config, &mut runner);

    assert_eq!(runner.kinds(), vec![StepKind::Version]);
    assert!(out.contains("[DRY RUN] python3 -m pip install feedparser requests"));
    assert!(out.contains("[DRY RUN] python3 rss_crawler.py"));
    assert_eq!(report.dependencies, Some(DependencyOutcome::Skipped));
    assert_eq!(report.crawler, Some(CrawlerOutcome::Skipped));
    assert!(!out.contains(SUCCESS_MSG));
    assert!(!out.contains(FAILURE_MSG));
    assert_eq!(report.exit_code, 0);
}

#[test]
fn test_dry_run_still_aborts_without_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    let config = crawl_launcher::LauncherConfig {
        dry_run: true,
        ..config_in(dir.path())
    };
    let mut runner = FakeRunner::without_interpreter();

    let (report, out) = launch(&config, &mut runner);
    assert_eq!(report.exit_code, 1);
    assert!(!out.contains("[DRY RUN]"));
}

// =============================================================================
// Console failures
// =============================================================================

/// Accepts the first line, then fails every write like a closed pipe
struct ClosedAfterFirstLine {
    closed: bool,
}

impl std::io::Write for ClosedAfterFirstLine {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout closed",
            ));
        }
        if buf.contains(&b'\n') {
            self.closed = true;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_closed_stdout_does_not_stop_launch() {
    use crawl_launcher::console::Console;
    use crawl_launcher::launcher::Launcher;

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut runner = FakeRunner::default().with_install_code(1);

    let report = {
        let console = Console::new(ClosedAfterFirstLine { closed: false });
        let mut launcher = Launcher::new(&config, &mut runner, console);
        launcher.run().expect("console failures are not launch errors")
    };

    assert_eq!(
        runner.kinds(),
        vec![StepKind::Version, StepKind::Install, StepKind::Crawler]
    );
    assert_eq!(report.crawler, Some(CrawlerOutcome::Succeeded));
    assert_eq!(report.final_stage, LaunchStage::Completed);
    assert_eq!(report.exit_code, 0);
}
