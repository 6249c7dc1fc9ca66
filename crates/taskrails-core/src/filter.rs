use crate::state::TaskStatus;
use crate::task::Task;

/// Case-insensitive substring matcher for task fields.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Determine whether any textual field on the task contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(task.id.as_str())
            || self.matches_field(&task.title)
            || task
                .description
                .as_deref()
                .is_some_and(|description| self.matches_field(description))
            || task.tag.as_deref().is_some_and(|tag| self.matches_field(tag))
            || task
                .assignee
                .as_deref()
                .is_some_and(|assignee| self.matches_field(assignee))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

/// Board view filter: column, role and free text.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Keep only tasks in this column.
    pub status: Option<TaskStatus>,
    /// Keep only tasks assigned to this role id.
    pub assignee: Option<String>,
    /// Keep only tasks whose text contains the query.
    pub text: Option<TextMatcher>,
}

impl TaskFilter {
    /// Returns true when the filter lets every task through.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee.is_none() && self.text.is_none()
    }

    /// Determine whether the task passes every configured criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.as_ref().is_none_or(|status| &task.status == status)
            && self
                .assignee
                .as_deref()
                .is_none_or(|role| task.assignee.as_deref() == Some(role))
            && self.text.as_ref().is_none_or(|matcher| matcher.matches(task))
    }

    /// Select matching tasks, preserving the order of `tasks`.
    #[must_use]
    pub fn apply<'a, I>(&self, tasks: I) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks.into_iter().filter(|task| self.matches(task)).collect()
    }
}
