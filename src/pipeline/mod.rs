//! In-memory text steps shared by the tasks.
//!
//! Tasks read files into [`Artifact`]s, run them through these pure
//! functions and write the result to the output tree. Nothing here touches
//! external tools.

mod artifact;
mod concat;
mod inject;
mod rewrite;

pub use artifact::{copy_files, read_all, read_required, Artifact};
pub use concat::{concat, SEPARATOR};
pub use inject::{Wrapper, BODY, SCRIPT, STYLE};
pub use rewrite::PathRewriter;
