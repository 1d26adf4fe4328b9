//! Launcher configuration: defaults, JSON file loading, and validation.
//!
//! Every field has a default, so running without a configuration file
//! performs the standard launch: `python3 --version`, `python3 -m pip install
//! feedparser requests`, then `python3 rss_crawler.py`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

/// How the final process exit code is chosen once the pipeline completes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExitPolicy {
    /// Exit with the crawler's status
    #[default]
    Propagate,
    /// Always exit 0 after completion
    Legacy,
}

/// Launcher configuration that can be loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Interpreter resolved on PATH
    pub interpreter: String,
    /// Packages passed to `pip install`
    pub packages: Vec<String>,
    /// Crawler program file, relative to the working directory
    pub crawler: PathBuf,
    /// Directory the crawler runs in (current directory when unset)
    pub working_dir: Option<PathBuf>,
    /// Config file the crawler reads at startup
    pub crawler_config: PathBuf,
    /// File the crawler appends every discovered link to. When unset, the
    /// `output_file` key of the crawler's config decides.
    pub links_file: Option<PathBuf>,
    /// File the crawler appends failed feeds to
    pub failed_log: PathBuf,
    pub exit_policy: ExitPolicy,
    /// Wait for a keypress before exiting
    pub pause: bool,
    /// Print the install and crawler commands instead of running them
    pub dry_run: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            packages: vec!["feedparser".to_string(), "requests".to_string()],
            crawler: PathBuf::from("rss_crawler.py"),
            working_dir: None,
            crawler_config: PathBuf::from("config.json"),
            links_file: None,
            failed_log: PathBuf::from("failed_feeds.log"),
            exit_policy: ExitPolicy::Propagate,
            pause: true,
            dry_run: false,
        }
    }
}

impl LauncherConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            anyhow::bail!("Interpreter must be specified");
        }

        if self.crawler.as_os_str().is_empty() {
            anyhow::bail!("Crawler program must be specified");
        }

        if self.packages.is_empty() {
            anyhow::bail!("At least one package must be listed");
        }

        for package in &self.packages {
            validate_package_name(package)?;
        }

        Ok(())
    }

    /// Directory the crawler runs in and its output files live in
    pub fn crawler_dir(&self) -> PathBuf {
        self.working_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a crawler-relative path against the working directory
    pub fn in_crawler_dir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.crawler_dir().join(path)
        }
    }
}

/// A package name is passed as a single pip argument: it cannot be empty,
/// contain whitespace, or look like an option.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Package name cannot be empty");
    }
    if name.chars().any(char::is_whitespace) {
        anyhow::bail!("Package name '{}' contains whitespace", name);
    }
    if name.starts_with('-') {
        anyhow::bail!("Package name '{}' cannot start with '-'", name);
    }
    Ok(())
}
