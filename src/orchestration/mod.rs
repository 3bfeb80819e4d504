//! Orchestration layer: schedules registered tasks onto the runtime and
//! drives the rebuild loop while `watch` is active.

mod scheduler;

pub use scheduler::{Orchestrator, SchedulerEvent};
