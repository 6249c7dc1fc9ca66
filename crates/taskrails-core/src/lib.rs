//! Domain model for TaskRails boards: tasks, lifecycle rules, ordering and the
//! Markdown interchange format.

/// Error types.
pub mod error;
/// Board view filters.
pub mod filter;
/// Lifecycle capability rules and the rework fork.
pub mod guard;
/// Identifier types.
pub mod id;
pub mod markdown;
pub mod sort;
/// Lifecycle columns.
pub mod state;
pub mod store;
pub mod task;

pub use error::{Command, ParseTaskIdError, TaskError};
pub use filter::{TaskFilter, TextMatcher};
pub use guard::{Capabilities, Rework, TransitionGuard};
pub use id::TaskId;
pub use state::TaskStatus;
pub use store::TaskStore;
pub use task::{Task, TaskContent};
