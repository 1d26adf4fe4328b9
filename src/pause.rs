//! Final "press any key" prompt.
//!
//! Only shown when a person is watching: stdin and stdout must both be
//! terminals, and it can be turned off with `--no-pause` or
//! `CRAWL_LAUNCHER_NO_PAUSE=1`.

use crate::error::{LauncherError, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, IsTerminal, Write};

/// Environment variable that disables the pause
pub const NO_PAUSE_ENV: &str = "CRAWL_LAUNCHER_NO_PAUSE";

fn is_truthy(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// True when `CRAWL_LAUNCHER_NO_PAUSE` is set to 1/true
pub fn pause_disabled_by_env() -> bool {
    is_truthy(std::env::var(NO_PAUSE_ENV).ok().as_deref())
}

/// Decide whether to pause at the end of a launch
pub fn should_pause(configured: bool) -> bool {
    configured
        && !pause_disabled_by_env()
        && io::stdin().is_terminal()
        && io::stdout().is_terminal()
}

/// Print `prompt` and block until a key is pressed.
pub fn wait_for_keypress(prompt: &str) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    enable_raw_mode()
        .map_err(|e| LauncherError::terminal(format!("Failed to enable raw mode: {}", e)))?;

    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => {
                break Err(LauncherError::terminal(format!(
                    "Failed to read key press: {}",
                    e
                )));
            }
        }
    };

    // Always attempt cleanup, even if the read failed
    let _ = disable_raw_mode();
    writeln!(stdout)?;

    result
}
