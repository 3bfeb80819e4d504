//! Core domain models: task declarations, the registry and the execution DAG.

pub mod dag;
pub mod registry;
pub mod task;

pub use dag::TaskGraph;
pub use registry::Registry;
pub use task::{Action, Profile, Sequence, Task, TaskBody, TaskInfo, TaskRun, TaskStatus};
