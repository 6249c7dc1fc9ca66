//! Copy-on-write task collection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::id::TaskId;
use crate::sort;
use crate::task::Task;

/// First identifier handed out on an empty board.
const FIRST_TASK_NUMBER: u64 = 101;

/// Insertion-ordered, id-keyed task collection.
///
/// Every mutating operation returns a new snapshot and leaves `self` as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Build a collection, rejecting repeated identifiers.
    ///
    /// # Errors
    /// Returns [`TaskError::DuplicateId`] for the first repeated id.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, TaskError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(&task.id) {
                return Err(TaskError::DuplicateId(task.id.clone()));
            }
        }
        Ok(Self { tasks })
    }

    /// Every task in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when the collection holds no tasks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task.
    ///
    /// # Errors
    /// Returns [`TaskError::DuplicateId`] when the id is already present.
    pub fn add(&self, task: Task) -> Result<Self, TaskError> {
        if self.get(&task.id).is_some() {
            return Err(TaskError::DuplicateId(task.id));
        }
        let mut tasks = self.tasks.clone();
        tasks.push(task);
        Ok(Self { tasks })
    }

    /// Swap the task stored under `id`, keeping its position.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when `id` is absent and
    /// [`TaskError::DuplicateId`] when the replacement takes another task's id.
    pub fn replace(&self, id: &TaskId, task: Task) -> Result<Self, TaskError> {
        let index = self.position(id)?;
        if &task.id != id && self.get(&task.id).is_some() {
            return Err(TaskError::DuplicateId(task.id));
        }
        let mut tasks = self.tasks.clone();
        if let Some(slot) = tasks.get_mut(index) {
            *slot = task;
        }
        Ok(Self { tasks })
    }

    /// Drop the task stored under `id`.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when `id` is absent.
    pub fn remove(&self, id: &TaskId) -> Result<Self, TaskError> {
        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        tasks.remove(index);
        Ok(Self { tasks })
    }

    /// Identifier one past the largest numeric id in the collection.
    #[must_use]
    pub fn next_id(&self) -> TaskId {
        let next = self
            .tasks
            .iter()
            .filter_map(|task| task.id.number())
            .max()
            .map_or(FIRST_TASK_NUMBER, |max| max.saturating_add(1));
        let mut candidate = next;
        // Saturation at u64::MAX can collide with an existing id.
        while self.get(&TaskId::from_number(candidate)).is_some() {
            candidate = candidate.wrapping_add(1);
        }
        TaskId::from_number(candidate)
    }

    /// Presentation order (phase, then priority); stored order is untouched.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Task> {
        sort::sorted(&self.tasks)
    }

    fn position(&self, id: &TaskId) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }
}

impl TryFrom<Vec<Task>> for TaskStore {
    type Error = TaskError;

    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        Self::from_tasks(tasks)
    }
}

impl From<TaskStore> for Vec<Task> {
    fn from(store: TaskStore) -> Self {
        store.tasks
    }
}

impl<'a> IntoIterator for &'a TaskStore {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
