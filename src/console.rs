//! User-facing console output.
//!
//! All human-readable feedback of a launch goes through `Console`, which
//! wraps any writer so tests can capture exactly what the user would see.
//! Diagnostics for developers go through `tracing` instead.
//!
//! Output is best-effort: a closed or broken stdout must never stop the
//! launch, so write errors are logged and dropped.

use std::io::{self, Write};
use std::path::Path;

/// Console writer for launch feedback
pub struct Console<W: Write> {
    out: W,
    /// Set after the first failed write so the warning is logged once
    broken: bool,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out, broken: false }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let written = writeln!(self.out, "{}", text.as_ref()).and_then(|()| self.out.flush());
        if let Err(e) = written {
            if !self.broken {
                tracing::warn!(error = %e, "console write failed, further output is dropped");
                self.broken = true;
            }
        }
    }

    pub fn interpreter_version(&mut self, version: &str) {
        self.line(format!("✓ {}", version));
    }

    pub fn interpreter_missing(&mut self, interpreter: &str) {
        self.line(format!("✗ ERROR: `{}` was not found.", interpreter));
        self.install_hint();
    }

    pub fn interpreter_check_failed(&mut self, interpreter: &str, reason: &str) {
        self.line(format!("✗ ERROR: `{}` could not report its version.", interpreter));
        self.line(format!("   {}", reason));
        self.install_hint();
    }

    fn install_hint(&mut self) {
        self.line("   Install Python 3 from https://www.python.org/downloads/");
        self.line("   and make sure it is added to your PATH, then run this launcher again.");
    }

    pub fn installing_dependencies(&mut self, packages: &[String]) {
        self.line(format!("Installing dependencies: {}", packages.join(" ")));
    }

    pub fn dependency_install_failed(&mut self) {
        self.line("⚠ WARNING: Dependency installation failed.");
        self.line("   Try running the launcher again with administrator privileges (e.g. sudo).");
        self.line("   Continuing anyway...");
    }

    pub fn starting_crawler(&mut self, crawler: &Path) {
        self.line(format!("Starting crawler: {}", crawler.display()));
    }

    pub fn crawler_file_missing(&mut self, crawler: &Path) {
        self.line(format!(
            "⚠ WARNING: Crawler program {} not found in the working directory.",
            crawler.display()
        ));
    }

    pub fn crawler_config_missing(&mut self, config: &Path) {
        self.line(format!(
            "⚠ WARNING: {} not found; the crawler may fail to start.",
            config.display()
        ));
    }

    pub fn crawler_failed(&mut self) {
        self.line("✗ ERROR: The crawler did not finish successfully.");
        self.line("   Check your network connection or the crawler program for errors.");
    }

    pub fn crawler_succeeded(&mut self) {
        self.line("✓ Crawler finished successfully. Results were saved in the working directory.");
    }

    pub fn new_links(&mut self, count: usize, links_file: &Path) {
        self.line(format!("   {} new link(s) appended to {}", count, links_file.display()));
    }

    pub fn failed_feeds_logged(&mut self, failed_log: &Path) {
        self.line(format!("   Some feeds failed; see {}", failed_log.display()));
    }

    pub fn dry_run(&mut self, command: &str) {
        self.line(format!("[DRY RUN] {}", command));
    }
}

/// Prompt shown before the final keypress wait
pub const PAUSE_PROMPT: &str = "Press any key to exit...";
