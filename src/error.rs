use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{tool} exited with {status}: {stderr}")]
    Tool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Tool not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
