use taskrails_core::markdown::{self, ParsedDocument};
use taskrails_core::{Command, Rework, Task, TaskContent, TaskError, TaskId, TaskStatus, TaskStore, TransitionGuard};
use tracing::{debug, info, warn};

use crate::config::TaskDefaults;
use crate::task_patch::TaskUpdate;

/// Outcome of an accepted command: the next snapshot plus the command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    /// Snapshot with the command applied.
    pub store: TaskStore,
    /// Command-specific result.
    pub output: T,
}

/// Request payload for creating a task with caller-supplied content.
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    /// Target column; only todo is accepted.
    pub status: TaskStatus,
    /// Initial content.
    pub content: TaskContent,
}

/// Service façade implementing every board command over store snapshots.
#[derive(Debug, Clone, Default)]
pub struct TaskService {
    defaults: TaskDefaults,
}

#[allow(clippy::unused_self)]
impl TaskService {
    /// Create a service handing out `defaults` to added tasks.
    #[must_use]
    pub const fn new(defaults: TaskDefaults) -> Self {
        Self { defaults }
    }

    /// Content used by [`Self::add_task`].
    #[must_use]
    pub const fn defaults(&self) -> &TaskDefaults {
        &self.defaults
    }

    /// Add a task with the configured default content.
    ///
    /// # Errors
    /// Returns [`TaskError::IllegalTransition`] unless `status` is todo.
    pub fn add_task(&self, store: &TaskStore, status: &TaskStatus) -> Result<Applied<Task>, TaskError> {
        self.create_task(
            store,
            CreateTaskRequest {
                status: status.clone(),
                content: self.defaults.content(),
            },
        )
    }

    /// Add a task with caller content.
    ///
    /// # Errors
    /// Returns [`TaskError::IllegalTransition`] unless the target column is todo.
    pub fn create_task(&self, store: &TaskStore, request: CreateTaskRequest) -> Result<Applied<Task>, TaskError> {
        let CreateTaskRequest { status, content } = request;
        TransitionGuard::check_add(&status).inspect_err(|err| rejected(Command::Add, err))?;

        let task = Task::from_content(store.next_id(), status, content);
        let store = store.add(task.clone())?;
        info!(task = %task.id, status = %task.status, "Created task");
        Ok(Applied { store, output: task })
    }

    /// Replace a task with an edited version.
    ///
    /// The stored state decides whether the save is allowed; the stored rework
    /// flag is kept whatever the edited task says.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for unknown ids and
    /// [`TaskError::IllegalTransition`] when the stored task is locked or the
    /// edited status is outside the lifecycle.
    pub fn update_task(&self, store: &TaskStore, edited: Task) -> Result<Applied<Task>, TaskError> {
        let current = lookup(store, &edited.id)?;
        TransitionGuard::check(current, Command::Save).inspect_err(|err| rejected(Command::Save, err))?;
        if !edited.status.is_canonical() {
            let err = TaskError::IllegalTransition {
                command: Command::Save,
                state: format!("moving to {}", edited.status),
            };
            rejected(Command::Save, &err);
            return Err(err);
        }

        let task = Task {
            is_reworked: current.is_reworked,
            ..edited.normalized()
        };
        let store = store.replace(&current.id, task.clone())?;
        info!(task = %task.id, status = %task.status, "Updated task");
        Ok(Applied { store, output: task })
    }

    /// Apply a field-wise patch to a stored task.
    ///
    /// # Errors
    /// Same as [`Self::update_task`].
    pub fn edit_task(&self, store: &TaskStore, id: &TaskId, update: &TaskUpdate) -> Result<Applied<Task>, TaskError> {
        let current = lookup(store, id)?;
        self.update_task(store, update.apply_to(current))
    }

    /// Remove a task. The output is the removed task.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for unknown ids and
    /// [`TaskError::IllegalTransition`] unless the task may be deleted.
    pub fn delete_task(&self, store: &TaskStore, id: &TaskId) -> Result<Applied<Task>, TaskError> {
        let current = lookup(store, id)?;
        TransitionGuard::check(current, Command::Delete).inspect_err(|err| rejected(Command::Delete, err))?;

        let removed = current.clone();
        let store = store.remove(id)?;
        info!(task = %removed.id, "Deleted task");
        Ok(Applied { store, output: removed })
    }

    /// Fork a finished task into a new todo task carrying `edited`.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for unknown ids and
    /// [`TaskError::IllegalTransition`] unless the task is done and not yet reworked.
    pub fn rework_task(&self, store: &TaskStore, id: &TaskId, edited: TaskContent) -> Result<Applied<Rework>, TaskError> {
        let (store, rework) =
            TransitionGuard::apply_rework(store, id, edited).inspect_err(|err| rejected(Command::Rework, err))?;
        info!(original = %rework.locked.id, created = %rework.created.id, "Reworked task");
        Ok(Applied { store, output: rework })
    }

    /// Move a task one column forward (todo to doing, doing to done).
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for unknown ids and
    /// [`TaskError::IllegalTransition`] when the task cannot advance.
    pub fn advance_task(&self, store: &TaskStore, id: &TaskId) -> Result<Applied<Task>, TaskError> {
        let current = lookup(store, id)?;
        TransitionGuard::check(current, Command::Advance).inspect_err(|err| rejected(Command::Advance, err))?;
        let Some(next) = current.status.next() else {
            return Err(TaskError::IllegalTransition {
                command: Command::Advance,
                state: format!("in {}", current.status),
            });
        };

        let task = Task {
            status: next,
            ..current.clone()
        };
        let store = store.replace(id, task.clone())?;
        info!(task = %task.id, status = %task.status, "Advanced task");
        Ok(Applied { store, output: task })
    }

    /// Serialize the snapshot to the interchange document.
    #[must_use]
    pub fn export_document(&self, store: &TaskStore) -> String {
        let text = markdown::render(store.all());
        debug!(tasks = store.len(), bytes = text.len(), "Exported document");
        text
    }

    /// Parse an interchange document, logging every dropped fragment.
    #[must_use]
    pub fn import_document(&self, text: &str) -> ParsedDocument {
        let document = markdown::parse(text);
        for warning in &document.warnings {
            warn!(%warning, "Dropped part of the document");
        }
        debug!(
            tasks = document.tasks.len(),
            headers = document.headers_seen,
            "Parsed document"
        );
        document
    }
}

fn lookup<'a>(store: &'a TaskStore, id: &TaskId) -> Result<&'a Task, TaskError> {
    store.get(id).ok_or_else(|| TaskError::NotFound(id.clone()))
}

fn rejected(command: Command, err: &TaskError) {
    debug!(%command, %err, "Rejected command");
}
