use taskrails_core::{Task, TaskContent, TaskStatus};

/// Patch for an optional text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalPatch {
    /// Overwrite with a new value.
    Set(String),
    /// Remove the value.
    Clear,
}

impl OptionalPatch {
    fn apply(&self, current: &mut Option<String>) {
        *current = match self {
            Self::Set(value) => Some(value.clone()),
            Self::Clear => None,
        };
    }
}

/// Field-wise task edit shared by front ends.
///
/// `None` leaves a field untouched. The result always passes through the
/// defaulting policy, so `Set` with a blank value behaves like `Clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Overwrite the title.
    pub title: Option<String>,
    /// Patch applied to the description.
    pub description: Option<OptionalPatch>,
    /// Overwrite the phase.
    pub phase: Option<String>,
    /// Overwrite the priority.
    pub priority: Option<String>,
    /// Patch applied to the tag.
    pub tag: Option<OptionalPatch>,
    /// Patch applied to the assignee.
    pub assignee: Option<OptionalPatch>,
    /// Move the task to another column. Ignored when forking a rework.
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    /// Returns true when the update would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.phase.is_none()
            && self.priority.is_none()
            && self.tag.is_none()
            && self.assignee.is_none()
            && self.status.is_none()
    }

    /// Apply the content fields of the patch.
    #[must_use]
    pub fn apply_content(&self, mut content: TaskContent) -> TaskContent {
        if let Some(title) = &self.title {
            content.title.clone_from(title);
        }
        if let Some(phase) = &self.phase {
            content.phase.clone_from(phase);
        }
        if let Some(priority) = &self.priority {
            content.priority.clone_from(priority);
        }
        if let Some(patch) = &self.description {
            patch.apply(&mut content.description);
        }
        if let Some(patch) = &self.tag {
            patch.apply(&mut content.tag);
        }
        if let Some(patch) = &self.assignee {
            patch.apply(&mut content.assignee);
        }
        content.normalized()
    }

    /// Build the edited version of `task`. Identity and the rework lock are
    /// carried over unchanged.
    #[must_use]
    pub fn apply_to(&self, task: &Task) -> Task {
        let content = self.apply_content(task.content());
        let status = self.status.clone().unwrap_or_else(|| task.status.clone());
        Task {
            is_reworked: task.is_reworked,
            ..Task::from_content(task.id.clone(), status, content)
        }
    }
}
