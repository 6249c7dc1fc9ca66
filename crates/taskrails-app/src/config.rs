use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskrails_core::TaskContent;
use taskrails_core::task::{DEFAULT_PHASE, DEFAULT_PRIORITY};

const CONFIG_DIR: &str = ".taskrails";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DOCUMENT: &str = "TASKS.md";
const DEFAULT_TITLE: &str = "New Task";
const DEFAULT_TAG: &str = "General";

/// Top-level project configuration loaded from `.taskrails/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Where the board document lives.
    #[serde(default)]
    pub board: BoardConfig,
    /// Content given to tasks created without explicit fields.
    #[serde(default)]
    pub defaults: TaskDefaults,
}

impl ProjectConfig {
    /// Load configuration from a project directory.
    ///
    /// A missing file yields the built-in defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    /// Board document path resolved against the project directory.
    #[must_use]
    pub fn document_path(&self, workdir: impl AsRef<Path>) -> PathBuf {
        workdir.as_ref().join(&self.board.document)
    }

    fn validate(&self) -> Result<()> {
        self.board.validate()?;
        self.defaults.validate()
    }
}

/// Board document block.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Document path, relative to the project directory unless absolute.
    #[serde(default = "default_document")]
    pub document: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            document: default_document(),
        }
    }
}

impl BoardConfig {
    fn validate(&self) -> Result<()> {
        if self.document.as_os_str().is_empty() {
            bail!("board document path must not be empty");
        }
        Ok(())
    }
}

fn default_document() -> PathBuf {
    PathBuf::from(DEFAULT_DOCUMENT)
}

/// Field values for tasks added without explicit content.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaskDefaults {
    /// Title of a freshly added task.
    pub title: String,
    /// Tag of a freshly added task.
    pub tag: Option<String>,
    /// Phase of a freshly added task.
    pub phase: String,
    /// Priority of a freshly added task.
    pub priority: String,
    /// Assignee of a freshly added task.
    pub assignee: Option<String>,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            tag: Some(DEFAULT_TAG.into()),
            phase: DEFAULT_PHASE.into(),
            priority: DEFAULT_PRIORITY.into(),
            assignee: None,
        }
    }
}

impl TaskDefaults {
    /// Content a new task starts from.
    #[must_use]
    pub fn content(&self) -> TaskContent {
        TaskContent {
            title: self.title.clone(),
            description: None,
            phase: self.phase.clone(),
            priority: self.priority.clone(),
            tag: self.tag.clone(),
            assignee: self.assignee.clone(),
        }
        .normalized()
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("default task title must not be empty");
        }
        if !self.priority.chars().any(|c| c.is_ascii_digit()) {
            bail!("default priority '{}' contains no digits", self.priority);
        }
        Ok(())
    }
}
