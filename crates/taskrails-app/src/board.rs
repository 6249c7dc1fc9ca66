//! Document-backed board: load, apply one command, write back.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error, Result};
use taskrails_core::markdown::{ImportOutcome, ParseWarning, ParsedDocument};
use taskrails_core::{Rework, Task, TaskContent, TaskError, TaskFilter, TaskId, TaskStatus, TaskStore};
use tracing::{info, warn};

use crate::service::{Applied, CreateTaskRequest, TaskService};
use crate::task_patch::TaskUpdate;

/// Abstraction over where the board document is kept.
pub trait DocumentStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Read the current document; `None` when it does not exist yet.
    ///
    /// # Errors
    /// Returns a store-specific error when reading fails.
    fn load(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the document.
    ///
    /// # Errors
    /// Returns a store-specific error when writing fails.
    fn save(&self, text: &str) -> Result<(), Self::Error>;
}

/// Board document stored as a plain file.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    /// Document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileDocument {
    type Error = Error;

    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    fn save(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, text).with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// Failures specific to board-level operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    /// The imported document yielded no task at all.
    #[error("no task could be recovered from the document ({headers} task headers seen)")]
    NothingToImport {
        /// Task-like headers present in the document.
        headers: usize,
    },
    /// Rewriting the document would drop fragments the parser could not read.
    #[error(
        "refusing to rewrite the board document: {} fragment(s) could not be parsed and would be lost ({}); fix the document or force the write",
        .warnings.len(),
        join_warnings(.warnings)
    )]
    UnparsedContent {
        /// Fragments the parser dropped.
        warnings: Vec<ParseWarning>,
    },
}

fn join_warnings(warnings: &[ParseWarning]) -> String {
    warnings.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Tasks read from the board document plus what the parser dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Recovered tasks.
    pub store: TaskStore,
    /// Whether every task header made it.
    pub outcome: ImportOutcome,
    /// Fragments that were dropped.
    pub warnings: Vec<ParseWarning>,
}

impl Snapshot {
    const fn empty() -> Self {
        Self {
            store: TaskStore::new(),
            outcome: ImportOutcome::Empty,
            warnings: Vec::new(),
        }
    }

    fn from_document(document: ParsedDocument) -> Result<Self> {
        let outcome = document.outcome();
        Ok(Self {
            store: TaskStore::from_tasks(document.tasks)?,
            outcome,
            warnings: document.warnings,
        })
    }

    /// Whether saving this snapshot keeps everything the document held.
    #[must_use]
    pub const fn is_lossless(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Summary of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Tasks now on the board.
    pub count: usize,
    /// Whether every task header made it.
    pub outcome: ImportOutcome,
    /// Fragments that were dropped.
    pub warnings: Vec<ParseWarning>,
}

/// One board document plus the service that mutates it.
///
/// Every command loads the document, applies a single service command and
/// saves the result. A rejected command never writes, and neither does a
/// command against a document the parser could only partly read, unless the
/// board is forced.
pub struct Board<S> {
    store: S,
    service: TaskService,
    force: bool,
}

impl<S: DocumentStore> Board<S> {
    /// Create a board over `store`.
    pub const fn new(store: S, service: TaskService) -> Self {
        Self {
            store,
            service,
            force: false,
        }
    }

    /// Allow commands to rewrite a document even when parts of it were dropped.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Command service used by this board.
    pub const fn service(&self) -> &TaskService {
        &self.service
    }

    /// Backing document store.
    pub const fn document(&self) -> &S {
        &self.store
    }

    /// Read the current document with its parse report. A missing document is
    /// an empty board.
    ///
    /// # Errors
    /// Returns an error when the document cannot be read.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let Some(text) = self.store.load().map_err(Into::into)? else {
            return Ok(Snapshot::empty());
        };
        Snapshot::from_document(self.service.import_document(&text))
    }

    /// Read the tasks currently on the board.
    ///
    /// # Errors
    /// Returns an error when the document cannot be read.
    pub fn load(&self) -> Result<TaskStore> {
        self.snapshot().map(|snapshot| snapshot.store)
    }

    /// Run one command against the current snapshot and persist the result.
    ///
    /// # Errors
    /// Returns [`BoardError::UnparsedContent`] when the document holds
    /// fragments that a rewrite would drop and the board is not forced, the
    /// command's [`TaskError`] (nothing is written in either case) or an I/O
    /// error.
    pub fn apply<T, F>(&self, command: F) -> Result<T>
    where
        F: FnOnce(&TaskService, &TaskStore) -> Result<Applied<T>, TaskError>,
    {
        let Snapshot { store: current, warnings, .. } = self.snapshot()?;
        if !warnings.is_empty() {
            if !self.force {
                return Err(BoardError::UnparsedContent { warnings }.into());
            }
            warn!(dropped = warnings.len(), "Forcing rewrite of partly parsed board document");
        }
        let Applied { store, output } = command(&self.service, &current)?;
        self.save(&store)?;
        Ok(output)
    }

    /// Add a todo task with the configured defaults.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn add(&self) -> Result<Task> {
        self.apply(|service, store| service.add_task(store, &TaskStatus::Todo))
    }

    /// Add a todo task with explicit content.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn create(&self, content: TaskContent) -> Result<Task> {
        self.apply(|service, store| {
            service.create_task(
                store,
                CreateTaskRequest {
                    status: TaskStatus::Todo,
                    content,
                },
            )
        })
    }

    /// Patch a task in place.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn edit(&self, id: &TaskId, update: &TaskUpdate) -> Result<Task> {
        self.apply(|service, store| service.edit_task(store, id, update))
    }

    /// Remove a task.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn delete(&self, id: &TaskId) -> Result<Task> {
        self.apply(|service, store| service.delete_task(store, id))
    }

    /// Move a task one column forward.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn advance(&self, id: &TaskId) -> Result<Task> {
        self.apply(|service, store| service.advance_task(store, id))
    }

    /// Fork a finished task, patching the copied content with `update`.
    ///
    /// # Errors
    /// See [`Self::apply`].
    pub fn rework(&self, id: &TaskId, update: &TaskUpdate) -> Result<Rework> {
        self.apply(|service, store| {
            let original = store.get(id).ok_or_else(|| TaskError::NotFound(id.clone()))?;
            let content = update.apply_content(original.content());
            service.rework_task(store, id, content)
        })
    }

    /// Look up one task.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] for unknown ids or an I/O error.
    pub fn show(&self, id: &TaskId) -> Result<Task> {
        let store = self.load()?;
        let task = store.get(id).ok_or_else(|| TaskError::NotFound(id.clone()))?;
        Ok(task.clone())
    }

    /// Sorted view narrowed by `filter`.
    ///
    /// # Errors
    /// Returns an error when the document cannot be read.
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let store = self.load()?;
        Ok(filter.apply(store.sorted()).into_iter().cloned().collect())
    }

    /// Current board as an interchange document.
    ///
    /// # Errors
    /// Returns an error when the document cannot be read.
    pub fn export(&self) -> Result<String> {
        let store = self.load()?;
        Ok(self.service.export_document(&store))
    }

    /// Replace the whole board with the tasks recovered from `text`.
    ///
    /// # Errors
    /// Returns [`BoardError::NothingToImport`] when no task is recovered (the
    /// board is left untouched) or an I/O error.
    pub fn import(&self, text: &str) -> Result<ImportReport> {
        let document = self.service.import_document(text);
        let outcome = document.outcome();
        if outcome == ImportOutcome::Empty {
            return Err(BoardError::NothingToImport {
                headers: document.headers_seen,
            }
            .into());
        }

        let store = TaskStore::from_tasks(document.tasks)?;
        self.save(&store)?;
        info!(tasks = store.len(), ?outcome, "Imported document");
        Ok(ImportReport {
            count: store.len(),
            outcome,
            warnings: document.warnings,
        })
    }

    fn save(&self, store: &TaskStore) -> Result<()> {
        let text = self.service.export_document(store);
        self.store.save(&text).map_err(Into::into)?;
        info!(tasks = store.len(), "Saved board document");
        Ok(())
    }
}
