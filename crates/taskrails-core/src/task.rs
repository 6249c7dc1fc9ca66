//! Task record and the defaulting policy shared by every entry point.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;
use crate::state::TaskStatus;

/// Phase assigned when none is given.
pub const DEFAULT_PHASE: &str = "PHASE 1";
/// Priority assigned when none is given or it cannot be parsed.
pub const DEFAULT_PRIORITY: &str = "3";
/// Numeric form of [`DEFAULT_PRIORITY`].
pub const DEFAULT_PRIORITY_RANK: u32 = 3;

/// A unit of work on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier within a collection.
    pub id: TaskId,
    /// Single-line title.
    pub title: String,
    /// Markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle column.
    pub status: TaskStatus,
    /// Ordinal grouping label such as `PHASE 2`.
    #[serde(default = "default_phase")]
    pub phase: String,
    /// Digits-only urgency; lower is more urgent.
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Free classification label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Role id responsible for the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Set once the task has been forked by a rework; the task is then read-only.
    #[serde(default)]
    pub is_reworked: bool,
}

fn default_phase() -> String {
    DEFAULT_PHASE.to_owned()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_owned()
}

impl Task {
    /// Create a task with default phase and priority and no optional fields.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id,
            title: normalize_title(&title.into()),
            description: None,
            status,
            phase: default_phase(),
            priority: default_priority(),
            tag: None,
            assignee: None,
            is_reworked: false,
        }
    }

    /// Build a task from editable content.
    #[must_use]
    pub fn from_content(id: TaskId, status: TaskStatus, content: TaskContent) -> Self {
        let TaskContent {
            title,
            description,
            phase,
            priority,
            tag,
            assignee,
        } = content.normalized();
        Self {
            id,
            title,
            description,
            status,
            phase,
            priority,
            tag,
            assignee,
            is_reworked: false,
        }
    }

    /// Copy out the user-editable fields.
    #[must_use]
    pub fn content(&self) -> TaskContent {
        TaskContent {
            title: self.title.clone(),
            description: self.description.clone(),
            phase: self.phase.clone(),
            priority: self.priority.clone(),
            tag: self.tag.clone(),
            assignee: self.assignee.clone(),
        }
    }

    /// Apply the defaulting policy to every field.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.title = normalize_title(&self.title);
        self.description = normalize_optional(self.description.as_deref());
        self.phase = normalize_phase(&self.phase);
        self.priority = normalize_priority(&self.priority);
        self.tag = normalize_optional(self.tag.as_deref()).map(|tag| normalize_title(&tag));
        self.assignee = normalize_optional(self.assignee.as_deref()).map(|who| normalize_title(&who));
        self
    }

    /// Numeric priority used for ordering.
    #[must_use]
    pub fn priority_rank(&self) -> u32 {
        priority_rank(&self.priority)
    }
}

/// Editable fields of a task (everything except id, status and the rework lock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContent {
    /// Task title.
    pub title: String,
    /// Markdown body.
    #[serde(default)]
    pub description: Option<String>,
    /// Phase label.
    #[serde(default = "default_phase")]
    pub phase: String,
    /// Priority label.
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Classification label.
    #[serde(default)]
    pub tag: Option<String>,
    /// Assigned role id.
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TaskContent {
    /// Content with the given title and defaults elsewhere.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            phase: default_phase(),
            priority: default_priority(),
            tag: None,
            assignee: None,
        }
    }

    /// Apply the defaulting policy to every field.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: normalize_title(&self.title),
            description: normalize_optional(self.description.as_deref()),
            phase: normalize_phase(&self.phase),
            priority: normalize_priority(&self.priority),
            tag: normalize_optional(self.tag.as_deref()).map(|tag| normalize_title(&tag)),
            assignee: normalize_optional(self.assignee.as_deref()).map(|who| normalize_title(&who)),
        }
    }
}

/// Collapse a title onto one trimmed line.
#[must_use]
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim the phase label, falling back to [`DEFAULT_PHASE`].
#[must_use]
pub fn normalize_phase(raw: &str) -> String {
    let trimmed = normalize_title(raw);
    if trimmed.is_empty() {
        default_phase()
    } else {
        trimmed
    }
}

/// Strip everything but digits and re-render the number, falling back to
/// [`DEFAULT_PRIORITY`].
#[must_use]
pub fn normalize_priority(raw: &str) -> String {
    parse_priority(raw).map_or_else(default_priority, |rank| rank.to_string())
}

/// Numeric priority of a raw label, [`DEFAULT_PRIORITY_RANK`] when unparsable.
#[must_use]
pub fn priority_rank(raw: &str) -> u32 {
    parse_priority(raw).unwrap_or(DEFAULT_PRIORITY_RANK)
}

fn parse_priority(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
