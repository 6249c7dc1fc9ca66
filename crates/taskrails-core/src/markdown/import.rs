use std::collections::HashSet;
use std::fmt;

use crate::id::TaskId;
use crate::state::TaskStatus;
use crate::task::{Task, normalize_phase, normalize_priority, normalize_title};

use super::{Field, REWORKED_MARKER, SEPARATOR, status_for_header};

/// Fragment of a document the parser had to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A `###` header without a valid `TSK-<digits>: <title>` shape.
    MalformedTaskHeader {
        /// 1-based line number.
        line: usize,
        /// Header text after the `###` marker.
        text: String,
    },
    /// A task block reusing an id emitted earlier in the document.
    DuplicateTask {
        /// 1-based line number of the dropped block's header.
        line: usize,
        /// Repeated identifier.
        id: TaskId,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTaskHeader { line, text } => {
                write!(f, "line {line}: ignored malformed task header '{text}'")
            }
            Self::DuplicateTask { line, id } => {
                write!(f, "line {line}: dropped duplicate task {id}")
            }
        }
    }
}

/// How much of a document survived parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No task could be recovered.
    Empty,
    /// Some task headers were dropped.
    Partial {
        /// Tasks returned.
        recovered: usize,
        /// Task headers present in the document.
        expected: usize,
    },
    /// Every task header produced a task.
    Complete {
        /// Tasks returned.
        count: usize,
    },
}

/// Tasks recovered from a document plus what was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Tasks in the order their blocks were closed.
    pub tasks: Vec<Task>,
    /// Dropped fragments.
    pub warnings: Vec<ParseWarning>,
    /// Task headers (valid or not) found in the document.
    pub headers_seen: usize,
}

impl ParsedDocument {
    /// Classify the result for the caller's confirmation prompt.
    #[must_use]
    pub const fn outcome(&self) -> ImportOutcome {
        let recovered = self.tasks.len();
        if recovered == 0 {
            ImportOutcome::Empty
        } else if recovered < self.headers_seen {
            ImportOutcome::Partial {
                recovered,
                expected: self.headers_seen,
            }
        } else {
            ImportOutcome::Complete { count: recovered }
        }
    }
}

/// Recover every task block from an interchange document.
///
/// Never fails: malformed headers are skipped, a missing trailing `---` still
/// emits the open task, and later blocks reusing an id are dropped.
#[must_use]
pub fn parse(text: &str) -> ParsedDocument {
    let mut parser = Parser::new();
    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line.strip_suffix('\r').unwrap_or(line));
    }
    parser.finish()
}

struct OpenTask {
    task: Task,
    line: usize,
    body: Vec<String>,
    capturing: bool,
}

impl OpenTask {
    fn has_body_text(&self) -> bool {
        self.body.iter().any(|line| !line.trim().is_empty())
    }

    fn apply(&mut self, field: Field, value: &str) {
        let task = &mut self.task;
        match field {
            Field::Phase => task.phase = normalize_phase(value),
            Field::Priority => task.priority = normalize_priority(value),
            Field::Tag => task.tag = non_empty(value),
            Field::Assignee => task.assignee = non_empty(value),
            Field::Status => {
                if value.contains(REWORKED_MARKER) {
                    task.is_reworked = true;
                }
                if let Some(label) = parenthesized(value) {
                    task.status = TaskStatus::from(label);
                }
            }
        }
    }

    fn capture(&mut self, line: &str) {
        let blank = line.trim().is_empty();
        if blank && !self.capturing && self.body.is_empty() {
            self.capturing = true;
            return;
        }
        if self.capturing || (!blank && !line.trim_start().starts_with('-')) {
            self.capturing = true;
            self.body.push(line.to_owned());
        }
    }

    fn into_task(self) -> Task {
        let description = self.body.join("\n");
        let description = description.trim();
        Task {
            description: (!description.is_empty()).then(|| description.to_owned()),
            ..self.task
        }
    }
}

struct Parser {
    status: TaskStatus,
    in_roles: bool,
    open: Option<OpenTask>,
    emitted: HashSet<TaskId>,
    doc: ParsedDocument,
}

impl Parser {
    fn new() -> Self {
        Self {
            status: TaskStatus::Todo,
            in_roles: false,
            open: None,
            emitted: HashSet::new(),
            doc: ParsedDocument::default(),
        }
    }

    fn feed(&mut self, number: usize, line: &str) {
        if let Some(header) = line.strip_prefix("## ") {
            // Role blocks share the `###` level with tasks but are not tasks.
            self.in_roles = header.trim().eq_ignore_ascii_case("ROLE REGISTRY");
            self.enter_section(header);
            return;
        }
        if let Some(rest) = line.strip_prefix("### ") {
            let label = rest.trim_start();
            // Extended exports nest columns as `### [STATUS: ...]`.
            if label.starts_with("[STATUS:") {
                self.enter_section(rest);
            } else if self.in_roles || label.starts_with("ROLE:") {
                self.close();
            } else if let Some((id, title)) = task_header(rest) {
                self.open_task(number, id, &title);
            } else {
                self.doc.headers_seen += 1;
                self.doc.warnings.push(ParseWarning::MalformedTaskHeader {
                    line: number,
                    text: rest.trim().to_owned(),
                });
            }
            return;
        }
        if let Some((id, title)) = line.strip_prefix("#### ").and_then(task_header) {
            self.open_task(number, id, &title);
            return;
        }

        let Some(open) = self.open.as_mut() else {
            return;
        };
        if line.trim() == SEPARATOR {
            self.close();
            return;
        }
        if !open.has_body_text() {
            if let Some((field, value)) = metadata(line) {
                open.apply(field, value);
                return;
            }
        }
        open.capture(line);
    }

    fn enter_section(&mut self, header: &str) {
        if let Some(status) = status_for_header(header) {
            self.status = status;
        }
    }

    fn open_task(&mut self, number: usize, id: TaskId, title: &str) {
        self.close();
        self.doc.headers_seen += 1;
        self.open = Some(OpenTask {
            task: Task::new(id, title, self.status.clone()),
            line: number,
            body: Vec::new(),
            capturing: false,
        });
    }

    fn close(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let line = open.line;
        let task = open.into_task();
        if self.emitted.insert(task.id.clone()) {
            self.doc.tasks.push(task);
        } else {
            self.doc
                .warnings
                .push(ParseWarning::DuplicateTask { line, id: task.id });
        }
    }

    fn finish(mut self) -> ParsedDocument {
        self.close();
        self.doc
    }
}

fn task_header(rest: &str) -> Option<(TaskId, String)> {
    let (id, title) = rest.split_once(':')?;
    let id = id.parse().ok()?;
    Some((id, normalize_title(title)))
}

fn metadata(line: &str) -> Option<(Field, &str)> {
    let rest = line.trim_start().strip_prefix("- **")?;
    let (label, value) = rest.split_once("**:")?;
    Some((Field::from_label(label)?, value.trim()))
}

fn parenthesized(value: &str) -> Option<&str> {
    let (_, rest) = value.split_once('(')?;
    let (label, _) = rest.split_once(')')?;
    let label = label.trim();
    (!label.is_empty()).then_some(label)
}

fn non_empty(value: &str) -> Option<String> {
    let value = normalize_title(value);
    (!value.is_empty()).then_some(value)
}
