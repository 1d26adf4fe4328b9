//! Launch State Machine
//!
//! The pipeline's progress is owned by a `LaunchContext` that only accepts
//! forward transitions to the next stage. The one way out of the sequence is
//! `abort()`, which is only legal while the interpreter is being checked.
//!
//! # Stage Flow
//!
//! ```text
//! NotStarted
//!     ↓
//! CheckingInterpreter ──→ Aborted
//!     ↓
//! InstallingDependencies
//!     ↓
//! RunningCrawler
//!     ↓
//! Reporting
//!     ↓
//! Completed
//! ```

use std::fmt;
use thiserror::Error;

/// Launch stages in sequential order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LaunchStage {
    /// Nothing has run yet
    NotStarted = 0,

    /// Step 1: querying the interpreter version
    CheckingInterpreter = 1,

    /// Step 2: installing the crawler's packages
    InstallingDependencies = 2,

    /// Step 3: the external crawler is running
    RunningCrawler = 3,

    /// Step 4: printing the crawler result
    Reporting = 4,

    /// Pipeline reached the end (terminal state)
    Completed = 5,

    /// Interpreter was missing (terminal state)
    Aborted = 255,
}

impl LaunchStage {
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Returns true if this is a terminal state (Completed or Aborted)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if a failure in this stage aborts the whole launch
    #[inline]
    pub const fn is_fatal_on_failure(self) -> bool {
        matches!(self, Self::CheckingInterpreter)
    }

    /// Returns the next stage in the sequence, or None at a terminal state
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::CheckingInterpreter),
            Self::CheckingInterpreter => Some(Self::InstallingDependencies),
            Self::InstallingDependencies => Some(Self::RunningCrawler),
            Self::RunningCrawler => Some(Self::Reporting),
            Self::Reporting => Some(Self::Completed),
            Self::Completed | Self::Aborted => None,
        }
    }

    /// Returns a human-readable description of this stage
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::CheckingInterpreter => "Checking interpreter",
            Self::InstallingDependencies => "Installing dependencies",
            Self::RunningCrawler => "Running crawler",
            Self::Reporting => "Reporting result",
            Self::Completed => "Launch complete",
            Self::Aborted => "Launch aborted",
        }
    }

    /// Returns all stages of the normal flow in order (excluding Aborted)
    pub const fn all_stages() -> &'static [Self] {
        &[
            Self::NotStarted,
            Self::CheckingInterpreter,
            Self::InstallingDependencies,
            Self::RunningCrawler,
            Self::Reporting,
            Self::Completed,
        ]
    }
}

impl fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchTransitionError {
    /// Attempted to skip one or more stages
    #[error("Cannot skip from {from} to {to}")]
    SkippedStage { from: LaunchStage, to: LaunchStage },

    /// Attempted to go backwards
    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition { from: LaunchStage, to: LaunchStage },

    /// Attempted to transition from a terminal state
    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: LaunchStage },

    /// Attempted to abort from a stage whose failures are not fatal
    #[error("Stage {stage} cannot abort the launch")]
    AbortNotAllowed { stage: LaunchStage },

    /// Attempted to transition to the same state
    #[error("Already at stage {stage}")]
    AlreadyAtStage { stage: LaunchStage },
}

/// Owner of the current launch stage.
///
/// # Example
///
/// ```
/// use crawl_launcher::launch_state::{LaunchContext, LaunchStage};
///
/// let mut ctx = LaunchContext::new();
/// ctx.advance().unwrap();
/// assert_eq!(ctx.current_stage(), LaunchStage::CheckingInterpreter);
///
/// // Cannot skip stages
/// assert!(ctx.transition_to(LaunchStage::RunningCrawler).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LaunchContext {
    current: LaunchStage,
    /// Every stage entered, in order
    history: Vec<LaunchStage>,
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchContext {
    pub fn new() -> Self {
        Self {
            current: LaunchStage::NotStarted,
            history: Vec::with_capacity(LaunchStage::all_stages().len()),
        }
    }

    #[inline]
    pub fn current_stage(&self) -> LaunchStage {
        self.current
    }

    pub fn history(&self) -> &[LaunchStage] {
        &self.history
    }

    /// Advance to the next stage in sequence.
    pub fn advance(&mut self) -> Result<LaunchStage, LaunchTransitionError> {
        let Some(next_stage) = self.current.next() else {
            return Err(LaunchTransitionError::FromTerminalState { from: self.current });
        };

        self.enter(next_stage);
        Ok(next_stage)
    }

    /// Transition to `target`, which must be the immediate next stage.
    pub fn transition_to(
        &mut self,
        target: LaunchStage,
    ) -> Result<LaunchStage, LaunchTransitionError> {
        if self.current.is_terminal() {
            return Err(LaunchTransitionError::FromTerminalState { from: self.current });
        }

        if target == self.current {
            return Err(LaunchTransitionError::AlreadyAtStage { stage: target });
        }

        // Aborted is only reachable through abort()
        if target == LaunchStage::Aborted {
            return Err(LaunchTransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }

        if target.order() < self.current.order() {
            return Err(LaunchTransitionError::BackwardTransition {
                from: self.current,
                to: target,
            });
        }

        if self.current.next() != Some(target) {
            return Err(LaunchTransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }

        self.enter(target);
        Ok(target)
    }

    /// Abort the launch. Only legal from a stage whose failure is fatal.
    pub fn abort(&mut self) -> Result<(), LaunchTransitionError> {
        if self.current.is_terminal() {
            return Err(LaunchTransitionError::FromTerminalState { from: self.current });
        }

        if !self.current.is_fatal_on_failure() {
            return Err(LaunchTransitionError::AbortNotAllowed {
                stage: self.current,
            });
        }

        self.enter(LaunchStage::Aborted);
        Ok(())
    }

    fn enter(&mut self, stage: LaunchStage) {
        tracing::debug!(from = %self.current, to = %stage, "launch stage transition");
        self.history.push(stage);
        self.current = stage;
    }
}
