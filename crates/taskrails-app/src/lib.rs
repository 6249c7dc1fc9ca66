//! Application layer logic for TaskRails.
//!
//! This crate provides the command service, edit patches, configuration and the
//! document-backed board shared by the command line front end.

pub mod board;
pub mod config;
pub mod service;
pub mod task_patch;

// Re-exports for convenience
pub use board::{Board, BoardError, DocumentStore, FileDocument, ImportReport, Snapshot};
pub use config::{BoardConfig, ProjectConfig, TaskDefaults};
pub use service::{Applied, CreateTaskRequest, TaskService};
pub use task_patch::{OptionalPatch, TaskUpdate};
