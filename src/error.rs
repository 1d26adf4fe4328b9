//! Error handling module for the launcher
//!
//! Provides centralized error types using thiserror. Step failures that the
//! launcher reports and recovers from are *not* errors: they are captured in
//! `StepOutput` and inspected by the pipeline. These types cover the cases
//! where something around the steps went wrong.

use crate::launch_state::LaunchTransitionError;
use thiserror::Error;

/// Main error type for the launcher
#[derive(Error, Debug)]
pub enum LauncherError {
    /// IO errors (pause prompt)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external command could not be started at all
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Launch state machine transition errors
    #[error("Launch transition error: {0}")]
    Transition(#[from] LaunchTransitionError),

    /// Terminal errors (raw mode, key reads)
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LauncherError>;

impl LauncherError {
    /// Create a spawn error for `program`
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// True when the error means the program was not found on PATH
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
