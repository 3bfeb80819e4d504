pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod fileset;
pub mod layout;
pub mod log;
pub mod orchestration;
pub mod pipeline;
pub mod services;
pub mod tasks;
pub mod toolchain;
pub mod util;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestration::{Orchestrator, SchedulerEvent};
