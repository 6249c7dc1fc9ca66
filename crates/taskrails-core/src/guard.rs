//! Which commands a task accepts in each lifecycle state.

use crate::error::{Command, TaskError};
use crate::id::TaskId;
use crate::state::TaskStatus;
use crate::store::TaskStore;
use crate::task::{Task, TaskContent};

/// Commands permitted for a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// The editor may be opened.
    pub open: bool,
    /// Edited fields may be committed directly.
    pub save: bool,
    /// The task may be removed.
    pub delete: bool,
    /// The task may be forked into a new todo task.
    pub rework: bool,
    /// The task may move to the next lifecycle column.
    pub advance: bool,
}

impl Capabilities {
    /// Whether `command` is permitted.
    #[must_use]
    pub const fn allows(self, command: Command) -> bool {
        match command {
            Command::Add => false,
            Command::Open => self.open,
            Command::Save => self.save,
            Command::Delete => self.delete,
            Command::Rework => self.rework,
            Command::Advance => self.advance,
        }
    }
}

/// Result of a successful rework fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rework {
    /// The original task, now permanently locked.
    pub locked: Task,
    /// The new todo task carrying the edited content.
    pub created: Task,
}

/// Stateless rule set for task commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionGuard;

impl TransitionGuard {
    /// Capabilities of a task in the given state.
    #[must_use]
    pub const fn capabilities(status: &TaskStatus, is_reworked: bool) -> Capabilities {
        if is_reworked {
            return Capabilities {
                open: false,
                save: false,
                delete: false,
                rework: false,
                advance: false,
            };
        }
        match status {
            TaskStatus::Todo => Capabilities {
                open: true,
                save: true,
                delete: true,
                rework: false,
                advance: true,
            },
            TaskStatus::Doing => Capabilities {
                open: false,
                save: false,
                delete: false,
                rework: false,
                advance: true,
            },
            TaskStatus::Done => Capabilities {
                open: true,
                save: false,
                delete: false,
                rework: true,
                advance: false,
            },
            TaskStatus::Other(_) => Capabilities {
                open: false,
                save: false,
                delete: true,
                rework: false,
                advance: false,
            },
        }
    }

    /// Capabilities of a concrete task.
    #[must_use]
    pub const fn capabilities_of(task: &Task) -> Capabilities {
        Self::capabilities(&task.status, task.is_reworked)
    }

    /// Only the todo column accepts new tasks.
    #[must_use]
    pub const fn can_add(status: &TaskStatus) -> bool {
        matches!(status, TaskStatus::Todo)
    }

    /// Fail unless a task may be added to `status`.
    ///
    /// # Errors
    /// Returns [`TaskError::IllegalTransition`] for every column except todo.
    pub fn check_add(status: &TaskStatus) -> Result<(), TaskError> {
        if Self::can_add(status) {
            Ok(())
        } else {
            Err(TaskError::IllegalTransition {
                command: Command::Add,
                state: format!("in {status}"),
            })
        }
    }

    /// Fail unless `task` accepts `command`.
    ///
    /// # Errors
    /// Returns [`TaskError::IllegalTransition`] naming the blocking state.
    pub fn check(task: &Task, command: Command) -> Result<(), TaskError> {
        if Self::capabilities_of(task).allows(command) {
            Ok(())
        } else {
            Err(TaskError::IllegalTransition {
                command,
                state: describe_state(task),
            })
        }
    }

    /// Fork a finished task: lock the original and add a new todo task with
    /// the edited content, in a single store commit.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when `original` is not in the store and
    /// [`TaskError::IllegalTransition`] unless it is done and not yet reworked.
    pub fn apply_rework(
        store: &TaskStore,
        original: &TaskId,
        edited: TaskContent,
    ) -> Result<(TaskStore, Rework), TaskError> {
        let current = store
            .get(original)
            .ok_or_else(|| TaskError::NotFound(original.clone()))?;
        Self::check(current, Command::Rework)?;

        let created = Task::from_content(store.next_id(), TaskStatus::Todo, edited);
        let locked = Task {
            is_reworked: true,
            ..current.clone()
        };

        let next = store
            .replace(original, locked.clone())?
            .add(created.clone())?;
        Ok((next, Rework { locked, created }))
    }
}

fn describe_state(task: &Task) -> String {
    if task.is_reworked {
        format!("{} and reworked", task.status)
    } else {
        format!("in {}", task.status)
    }
}
