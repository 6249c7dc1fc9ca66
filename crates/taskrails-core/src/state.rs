use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle column a task lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Waiting to be picked up.
    Todo,
    /// Actively being worked on; locked for edits.
    Doing,
    /// Finished.
    Done,
    /// Status label outside the fixed lifecycle (foreign documents).
    Other(String),
}

impl TaskStatus {
    /// The three lifecycle columns in board order.
    pub const CANONICAL: [Self; 3] = [Self::Todo, Self::Doing, Self::Done];

    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Other(label) => label,
        }
    }

    /// Returns true for todo, doing and done.
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Next column in the lifecycle, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::Doing),
            Self::Doing => Some(Self::Done),
            Self::Done | Self::Other(_) => None,
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "todo" => Self::Todo,
            "doing" => Self::Doing,
            "done" => Self::Done,
            _ => Self::Other(trimmed.to_owned()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Other(label) => label,
            canonical => canonical.as_str().to_owned(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_labels_parse_case_insensitively() {
        assert_eq!(TaskStatus::from("todo"), TaskStatus::Todo);
        assert_eq!(TaskStatus::from(" Doing "), TaskStatus::Doing);
        assert_eq!(TaskStatus::from("DONE"), TaskStatus::Done);
        assert_eq!(TaskStatus::from("blocked"), TaskStatus::Other("blocked".into()));
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        assert_eq!(TaskStatus::Todo.next(), Some(TaskStatus::Doing));
        assert_eq!(TaskStatus::Doing.next(), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::Done.next(), None);
        assert_eq!(TaskStatus::Other("x".into()).next(), None);
    }

    #[test]
    fn serde_uses_wire_labels() {
        let json = serde_json::to_string(&vec![TaskStatus::Doing, TaskStatus::Other("review".into())])
            .unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json, r#"["doing","review"]"#);
        let back: Vec<TaskStatus> =
            serde_json::from_str(&json).unwrap_or_else(|err| panic!("deserialize: {err}"));
        assert_eq!(back, vec![TaskStatus::Doing, TaskStatus::Other("review".into())]);
    }
}
