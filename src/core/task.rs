//! Task descriptors and per-run task state.
//!
//! A [`Task`] is the static declaration: a unique name, the prerequisites
//! that must finish first, and a body. A [`TaskRun`] is the record the
//! scheduler keeps while one scheduling pass executes that task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::context::BuildContext;
use crate::Result;

/// Synchronous work performed by an action task.
pub type Action = Arc<dyn Fn(&BuildContext) -> Result<()> + Send + Sync>;

/// Build flavour selected by the invoked target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    /// Source maps are only emitted for development builds.
    pub fn source_maps(&self) -> bool {
        matches!(self, Profile::Development)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
        }
    }
}

/// Ordered groups of task names. Groups run one after another; members of a
/// group may run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    groups: Vec<Vec<String>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group whose members may run in parallel.
    pub fn parallel(mut self, names: &[&str]) -> Self {
        self.groups
            .push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Append a group with a single task.
    pub fn then(self, name: &str) -> Self {
        self.parallel(&[name])
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn members(&self) -> impl Iterator<Item = &String> {
        self.groups.iter().flatten()
    }
}

pub enum TaskBody {
    Action(Action),
    Sequence(Sequence),
    /// Nothing beyond running the prerequisites.
    Aggregate,
}

impl fmt::Debug for TaskBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskBody::Action(_) => write!(f, "Action(..)"),
            TaskBody::Sequence(seq) => f.debug_tuple("Sequence").field(seq).finish(),
            TaskBody::Aggregate => write!(f, "Aggregate"),
        }
    }
}

/// A named unit of work with declared prerequisites.
#[derive(Debug)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    pub body: TaskBody,
    /// Profile used when this task is the invoked target.
    pub profile: Option<Profile>,
}

impl Task {
    fn with_body(name: &str, body: TaskBody) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            prerequisites: Vec::new(),
            body,
            profile: None,
        }
    }

    pub fn action<F>(name: &str, action: F) -> Self
    where
        F: Fn(&BuildContext) -> Result<()> + Send + Sync + 'static,
    {
        Self::with_body(name, TaskBody::Action(Arc::new(action)))
    }

    pub fn sequence(name: &str, sequence: Sequence) -> Self {
        Self::with_body(name, TaskBody::Sequence(sequence))
    }

    pub fn aggregate(name: &str) -> Self {
        Self::with_body(name, TaskBody::Aggregate)
    }

    pub fn after(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            prerequisites: self.prerequisites.clone(),
            sequence: match &self.body {
                TaskBody::Sequence(seq) => Some(seq.clone()),
                _ => None,
            },
        }
    }
}

/// Serializable summary of a task declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    pub prerequisites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sequence: Option<Sequence>,
}

/// Task status within one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed {
        error: String,
    },
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// Execution record of a task in one scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub name: String,
    pub status: TaskStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRun {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: TaskStatus::Pending,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = TaskStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: &str) {
        self.status = TaskStatus::Failed {
            error: error.to_string(),
        };
        self.completed_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Completed | TaskStatus::Failed { .. }
        )
    }

    pub fn can_start(&self) -> bool {
        matches!(self.status, TaskStatus::Pending)
    }
}
