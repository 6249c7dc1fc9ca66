//! Error types raised by the task store and the transition guard.

use std::fmt;

use thiserror::Error;

use crate::id::TaskId;

/// Commands checked by the [`TransitionGuard`](crate::guard::TransitionGuard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create a task in a column.
    Add,
    /// Open the editor for a task.
    Open,
    /// Commit edited fields directly.
    Save,
    /// Remove a task.
    Delete,
    /// Fork a finished task into a new todo task.
    Rework,
    /// Move a task one step forward in its lifecycle.
    Advance,
}

impl Command {
    /// Verb used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Open => "open",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Rework => "rework",
            Self::Advance => "advance",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by task commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// A task with the same identifier is already present.
    #[error("task {0} already exists")]
    DuplicateId(TaskId),
    /// No task with the identifier exists.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The command is not allowed in the task's current state.
    #[error("cannot {command} a task that is {state}")]
    IllegalTransition {
        /// Rejected command.
        command: Command,
        /// Human-readable description of the state that blocked it.
        state: String,
    },
}

/// Error returned when a string is not a `TSK-<digits>` identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid task id '{0}', expected TSK-<digits>")]
pub struct ParseTaskIdError(pub String);
