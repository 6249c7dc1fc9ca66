//! Markdown interchange format for a whole task collection.
//!
//! ```text
//! # TaskRails Project Export
//!
//! ## 待辦事項 / TODO
//!
//! ### TSK-101: Example Title
//! - **Phase**: PHASE 1
//! - **Priority**: P1
//! - **Tag**: Core
//! - **Assignee**: ai_codegen
//! - **Status**: [REWORKED]
//!
//! Free-text description body, any number of lines.
//!
//! ---
//! ```

mod export;
mod import;

pub use export::render;
pub use import::{ImportOutcome, ParseWarning, ParsedDocument, parse};

use crate::state::TaskStatus;

/// First line of every exported document.
pub const DOCUMENT_TITLE: &str = "# TaskRails Project Export";

/// Marker on the status bullet of a locked task.
pub const REWORKED_MARKER: &str = "[REWORKED]";

/// Line that terminates a task block.
pub const SEPARATOR: &str = "---";

const OTHER_SECTION_LABEL: &str = "其他 / OTHER";

/// Section keywords, tried in order against the uppercased header text.
/// A header containing keywords of several rows resolves to the first row.
const SECTION_KEYWORDS: [(&[&str], TaskStatus); 3] = [
    (&["TODO", "待辦事項"], TaskStatus::Todo),
    (&["IN PROGRESS", "進行中"], TaskStatus::Doing),
    (&["COMPLETED", "已完成"], TaskStatus::Done),
];

/// Bilingual section label written for a lifecycle column.
#[must_use]
pub const fn section_label(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "待辦事項 / TODO",
        TaskStatus::Doing => "進行中 / IN PROGRESS",
        TaskStatus::Done => "已完成 / COMPLETED",
        TaskStatus::Other(_) => OTHER_SECTION_LABEL,
    }
}

/// Column named by a section header, if any keyword matches.
#[must_use]
pub fn status_for_header(header: &str) -> Option<TaskStatus> {
    let upper = header.to_uppercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| upper.contains(keyword)))
        .map(|(_, status)| status.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Phase,
    Priority,
    Tag,
    Assignee,
    Status,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::Phase => "Phase",
            Self::Priority => "Priority",
            Self::Tag => "Tag",
            Self::Assignee => "Assignee",
            Self::Status => "Status",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "phase" => Some(Self::Phase),
            "priority" => Some(Self::Priority),
            "tag" => Some(Self::Tag),
            "assignee" => Some(Self::Assignee),
            // Extended project-context exports call the status line "Flags".
            "status" | "flags" => Some(Self::Status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_resolve_in_table_order() {
        assert_eq!(status_for_header("待辦事項 / TODO"), Some(TaskStatus::Todo));
        assert_eq!(status_for_header("進行中 / IN PROGRESS"), Some(TaskStatus::Doing));
        assert_eq!(status_for_header("Completed"), Some(TaskStatus::Done));
        assert_eq!(status_for_header("已完成"), Some(TaskStatus::Done));
        assert_eq!(status_for_header("Backlog"), None);
        assert_eq!(status_for_header("其他 / OTHER"), None);
    }

    #[test]
    fn ambiguous_header_takes_first_match() {
        assert_eq!(status_for_header("COMPLETED TODO items"), Some(TaskStatus::Todo));
    }

    #[test]
    fn labels_match_their_own_keywords() {
        for status in TaskStatus::CANONICAL {
            assert_eq!(status_for_header(section_label(&status)), Some(status.clone()));
        }
    }
}
