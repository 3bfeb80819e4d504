//! Best-effort removal of output and staging paths.
//!
//! Missing targets are fine and any other failure is recorded in the
//! [`CleanupReport`] and logged; cleanup never fails the task that asked for it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::context::BuildContext;
use crate::fileset::{relative_str, Pattern};
use crate::{slog_debug, slog_warn, Result};

/// Report of cleanup operations performed.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Paths that were removed (directories are removed with their contents).
    pub removed: Vec<PathBuf>,
    /// Paths that could not be removed.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether all cleanup operations succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// Remove every file or directory below `root` matched by one of `patterns`.
///
/// Patterns are relative to `root`. A matched directory is removed whole and
/// not descended into.
pub fn remove_matching(root: &Path, patterns: &[String]) -> Result<CleanupReport> {
    let mut report = CleanupReport::new();
    for raw in patterns {
        let pattern = Pattern::parse(raw)?;
        let start = root.join(pattern.base());
        let mut part = CleanupReport::new();
        sweep(root, &start, &pattern, &mut part);
        report.merge(part);
    }
    slog_debug!(
        "Cleanup: removed {} path(s), {} failure(s)",
        report.removed_count(),
        report.failed_count()
    );
    Ok(report)
}

fn sweep(root: &Path, dir: &Path, pattern: &Pattern, report: &mut CleanupReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return,
        Err(e) => {
            report.failed.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let matched = relative_str(root, &path)
            .map(|rel| pattern.matches(&rel))
            .unwrap_or(false);

        if matched {
            let result = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    slog_warn!("Could not remove {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        } else if is_dir {
            sweep(root, &path, pattern, report);
        }
    }
}

fn run_cleanup(ctx: &BuildContext, patterns: Vec<String>) -> Result<()> {
    let report = remove_matching(ctx.layout.project(), &patterns)?;
    if !report.is_success() {
        slog_warn!("Cleanup left {} path(s) behind", report.failed_count());
    }
    Ok(())
}

pub fn clean(ctx: &BuildContext) -> Result<()> {
    run_cleanup(ctx, ctx.layout.clean_patterns())
}

pub fn clean_tmp(ctx: &BuildContext) -> Result<()> {
    run_cleanup(ctx, ctx.layout.staging_patterns())
}
