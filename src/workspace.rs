//! Crawler workspace inspection
//!
//! The crawler is opaque, but its working directory has a known shape: the
//! program file, the `config.json` it reads, the links file it appends to,
//! and the log of failed feeds. The launcher checks the inputs before the run
//! and compares the outputs afterwards to summarize what happened.
//!
//! Nothing here is fatal. Problems are reported as warnings.

use crate::config::LauncherConfig;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Links file the crawler writes when its config names none
pub const DEFAULT_LINKS_FILE: &str = "all_links.txt";

/// Presence of the crawler's inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceCheck {
    pub crawler_present: bool,
    pub crawler_config_present: bool,
}

/// Check that the crawler program and its config exist
pub fn inspect(config: &LauncherConfig) -> WorkspaceCheck {
    let check = WorkspaceCheck {
        crawler_present: config.in_crawler_dir(&config.crawler).is_file(),
        crawler_config_present: config.in_crawler_dir(&config.crawler_config).is_file(),
    };
    tracing::debug!(?check, "workspace inspected");
    check
}

/// The part of the crawler's own config the launcher reads
#[derive(Debug, Default, Deserialize)]
struct CrawlerSettings {
    #[serde(default)]
    output_file: Option<PathBuf>,
}

/// Links file the crawler appends to, resolved against the working directory.
///
/// An explicit `links_file` wins; otherwise the crawler config's
/// `output_file` key is used, then `all_links.txt`. An unreadable or
/// malformed crawler config falls back to the default.
pub fn resolve_links_file(config: &LauncherConfig) -> PathBuf {
    let links_file = match &config.links_file {
        Some(path) => path.clone(),
        None => crawler_output_file(config).unwrap_or_else(|| PathBuf::from(DEFAULT_LINKS_FILE)),
    };
    config.in_crawler_dir(&links_file)
}

fn crawler_output_file(config: &LauncherConfig) -> Option<PathBuf> {
    let path = config.in_crawler_dir(&config.crawler_config);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not read crawler config");
            }
            return None;
        }
    };

    match serde_json::from_str::<CrawlerSettings>(&content) {
        Ok(settings) => settings.output_file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not parse crawler config");
            None
        }
    }
}

/// State of the crawler's output files at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSnapshot {
    /// Links file the count was taken from
    pub links_file: PathBuf,
    /// Non-empty lines in the links file
    pub link_count: usize,
    /// Size of the failed-feeds log in bytes
    pub failed_log_len: u64,
}

/// What a crawler run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub links_file: PathBuf,
    pub new_links: usize,
    pub failed_feeds_logged: bool,
}

impl OutputSnapshot {
    pub fn capture(config: &LauncherConfig) -> Self {
        let links_file = resolve_links_file(config);
        let failed_path = config.in_crawler_dir(&config.failed_log);

        Self {
            link_count: or_default_on_missing(count_links(&links_file), &links_file),
            failed_log_len: or_default_on_missing(
                fs::metadata(&failed_path).map(|m| m.len()),
                &failed_path,
            ),
            links_file,
        }
    }

    /// Compare with a snapshot taken after the run
    pub fn summarize(&self, after: &OutputSnapshot) -> RunSummary {
        RunSummary {
            links_file: after.links_file.clone(),
            new_links: after.link_count.saturating_sub(self.link_count),
            failed_feeds_logged: after.failed_log_len > self.failed_log_len,
        }
    }
}

fn count_links(path: &Path) -> io::Result<usize> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count())
}

fn or_default_on_missing<T: Default>(result: io::Result<T>, path: &Path) -> T {
    match result {
        Ok(value) => value,
        Err(e) if e.kind() == io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not inspect crawler output");
            T::default()
        }
    }
}
