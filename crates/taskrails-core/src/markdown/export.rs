use crate::state::TaskStatus;
use crate::task::Task;

use super::{DOCUMENT_TITLE, Field, REWORKED_MARKER, SEPARATOR, section_label};

/// Render a collection as an interchange document.
///
/// Tasks are grouped by column in the fixed order todo, doing, done, keeping
/// collection order inside each group; non-lifecycle statuses follow in a
/// trailing section with abbreviated blocks.
#[must_use]
pub fn render(tasks: &[Task]) -> String {
    let mut doc = Document::default();
    doc.line(DOCUMENT_TITLE);
    doc.blank();

    for status in TaskStatus::CANONICAL {
        let column: Vec<&Task> = tasks.iter().filter(|task| task.status == status).collect();
        if column.is_empty() {
            continue;
        }
        doc.section(&status);
        for task in column {
            doc.task_block(task);
        }
    }

    let others: Vec<&Task> = tasks.iter().filter(|task| !task.status.is_canonical()).collect();
    if let Some(first) = others.first() {
        doc.section(&first.status);
        for task in others {
            doc.other_block(task);
        }
    }

    doc.finish()
}

#[derive(Default)]
struct Document {
    out: String,
}

impl Document {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn section(&mut self, status: &TaskStatus) {
        self.line(&format!("## {}", section_label(status)));
        self.blank();
    }

    fn header(&mut self, task: &Task) {
        self.line(&format!("### {}: {}", task.id, task.title));
    }

    fn bullet(&mut self, field: Field, value: &str) {
        self.line(&format!("- **{}**: {value}", field.label()));
    }

    fn task_block(&mut self, task: &Task) {
        self.header(task);
        self.bullet(Field::Phase, &task.phase);
        self.bullet(Field::Priority, &format!("P{}", task.priority));
        if let Some(tag) = &task.tag {
            self.bullet(Field::Tag, tag);
        }
        if let Some(assignee) = &task.assignee {
            self.bullet(Field::Assignee, assignee);
        }
        if task.is_reworked {
            self.bullet(Field::Status, REWORKED_MARKER);
        }
        self.body(task);
    }

    fn other_block(&mut self, task: &Task) {
        self.header(task);
        let mut status = format!("({})", task.status);
        if task.is_reworked {
            status.push(' ');
            status.push_str(REWORKED_MARKER);
        }
        self.bullet(Field::Status, &status);
        self.body(task);
    }

    fn body(&mut self, task: &Task) {
        self.blank();
        if let Some(description) = &task.description {
            self.line(description);
            self.blank();
        }
        self.line(SEPARATOR);
        self.blank();
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;

    #[test]
    fn renders_documented_block() {
        let task = Task {
            tag: Some("Core".into()),
            assignee: Some("ai_codegen".into()),
            priority: "1".into(),
            description: Some("Free-text description body, any number of lines.".into()),
            is_reworked: true,
            ..Task::new(TaskId::from_number(101), "Example Title", TaskStatus::Todo)
        };

        let expected = "# TaskRails Project Export\n\
\n\
## 待辦事項 / TODO\n\
\n\
### TSK-101: Example Title\n\
- **Phase**: PHASE 1\n\
- **Priority**: P1\n\
- **Tag**: Core\n\
- **Assignee**: ai_codegen\n\
- **Status**: [REWORKED]\n\
\n\
Free-text description body, any number of lines.\n\
\n\
---\n\
\n";
        assert_eq!(render(&[task]), expected);
    }

    #[test]
    fn optional_bullets_and_body_are_omitted() {
        let task = Task::new(TaskId::from_number(7), "Bare", TaskStatus::Doing);
        let doc = render(&[task]);
        assert!(doc.contains("## 進行中 / IN PROGRESS\n\n### TSK-7: Bare\n- **Phase**: PHASE 1\n- **Priority**: P3\n\n---\n"));
        assert!(!doc.contains("**Tag**"));
        assert!(!doc.contains("**Assignee**"));
        assert!(!doc.contains("**Status**"));
    }

    #[test]
    fn sections_follow_lifecycle_order_and_skip_empty_columns() {
        let tasks = [
            Task::new(TaskId::from_number(3), "finished", TaskStatus::Done),
            Task::new(TaskId::from_number(1), "first todo", TaskStatus::Todo),
            Task::new(TaskId::from_number(2), "second todo", TaskStatus::Todo),
        ];
        let doc = render(&tasks);
        let todo = doc.find("## 待辦事項 / TODO").unwrap_or_else(|| panic!("todo section"));
        let done = doc.find("## 已完成 / COMPLETED").unwrap_or_else(|| panic!("done section"));
        assert!(todo < done);
        assert!(!doc.contains("IN PROGRESS"));
        let first = doc.find("TSK-1:").unwrap_or_else(|| panic!("TSK-1"));
        let second = doc.find("TSK-2:").unwrap_or_else(|| panic!("TSK-2"));
        assert!(first < second);
    }

    #[test]
    fn foreign_statuses_go_to_trailing_section() {
        let tasks = [
            Task {
                description: Some("waiting on review".into()),
                is_reworked: true,
                ..Task::new(TaskId::from_number(8), "Blocked work", TaskStatus::Other("blocked".into()))
            },
            Task::new(TaskId::from_number(1), "todo", TaskStatus::Todo),
        ];
        let doc = render(&tasks);
        assert!(doc.ends_with(
            "## 其他 / OTHER\n\n### TSK-8: Blocked work\n- **Status**: (blocked) [REWORKED]\n\nwaiting on review\n\n---\n\n"
        ));
        assert!(!doc.contains("- **Phase**: PHASE 1\n- **Priority**: P3\n- **Status**"));
    }

    #[test]
    fn empty_collection_is_title_only() {
        assert_eq!(render(&[]), "# TaskRails Project Export\n\n");
    }
}
