//! Long-lived collaborators started by `serve` and `watch`.
//!
//! The preview server is an external child process. The watcher forwards
//! relevant source changes into a channel that the orchestrator's watch loop
//! drains. Both stay alive after the target that started them has finished.

use notify::{Config as NotifyConfig, Event, EventKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::config::ToolCommand;
use crate::fileset::FileSet;
use crate::{slog, slog_debug, slog_trace, Error, Result};

/// Per-path debounce window for change events.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_seen: RwLock<HashMap<PathBuf, Instant>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: RwLock::new(HashMap::new()),
        }
    }

    /// Returns true if the change should be processed (not within the window).
    pub fn should_process(&self, path: &Path, now: Instant) -> bool {
        let Ok(mut state) = self.last_seen.write() else {
            return true;
        };
        if let Some(last) = state.get(path) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }
        state.insert(path.to_path_buf(), now);
        true
    }
}

struct ActiveWatch {
    _watcher: RecommendedWatcher,
    changes: Option<mpsc::Receiver<PathBuf>>,
}

/// Handles to the preview server and the source watcher.
#[derive(Default)]
pub struct Services {
    server: Mutex<Option<Child>>,
    watch: Mutex<Option<ActiveWatch>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("server", &self.server_running())
            .field("watching", &self.is_watching())
            .finish()
    }
}

fn poisoned(what: &str) -> Error {
    Error::Validation(format!("{} lock poisoned", what))
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_running(&self) -> bool {
        self.server.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn is_watching(&self) -> bool {
        self.watch.lock().map(|w| w.is_some()).unwrap_or(false)
    }

    /// Whether anything is left running that should keep the process alive.
    pub fn is_active(&self) -> bool {
        self.server_running() || self.is_watching()
    }

    /// Spawn the preview server serving `dist`. A second call is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_server(&self, command: &ToolCommand, dist: &Path, cwd: &Path) -> Result<()> {
        let mut server = self.server.lock().map_err(|_| poisoned("server"))?;
        if server.is_some() {
            slog_debug!("Preview server already running");
            return Ok(());
        }

        let program = which::which(&command.program)
            .map_err(|_| Error::ToolNotFound(command.program.clone()))?;
        let dist_str = dist.display().to_string();
        let args = command.render_args(&[("dist", &dist_str)]);
        slog_debug!("Starting preview server: {} {}", program.display(), args.join(" "));

        let child = Command::new(program)
            .args(&args)
            .current_dir(cwd)
            .kill_on_drop(true)
            .spawn()?;
        slog!("Serving {} (pid {})", dist.display(), child.id().unwrap_or_default());
        *server = Some(child);
        Ok(())
    }

    /// Watch `root` recursively and forward create/modify events for paths
    /// selected by any of `sets`. A second call is a no-op.
    pub fn start_watching(
        &self,
        root: &Path,
        sets: Vec<FileSet>,
        debounce: Duration,
    ) -> Result<()> {
        let mut watch = self.watch.lock().map_err(|_| poisoned("watch"))?;
        if watch.is_some() {
            slog_debug!("Watcher already running");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(256);
        let debouncer = Arc::new(Debouncer::new(debounce));

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let Ok(event) = res else {
                    return;
                };
                match event.kind {
                    EventKind::Modify(_) | EventKind::Create(_) => {}
                    _ => return,
                }
                for path in event.paths {
                    if !sets.iter().any(|set| set.matches(&path)) {
                        slog_trace!("Ignoring change to {}", path.display());
                        continue;
                    }
                    if debouncer.should_process(&path, Instant::now()) {
                        let _ = tx.blocking_send(path);
                    }
                }
            },
            NotifyConfig::default(),
        )?;

        if root.exists() {
            watcher.watch(root, RecursiveMode::Recursive)?;
        }
        slog!("Watching {}", root.display());

        *watch = Some(ActiveWatch {
            _watcher: watcher,
            changes: Some(rx),
        });
        Ok(())
    }

    /// Take the change stream. Only the first caller gets it.
    pub fn take_changes(&self) -> Option<mpsc::Receiver<PathBuf>> {
        self.watch
            .lock()
            .ok()
            .and_then(|mut w| w.as_mut().and_then(|active| active.changes.take()))
    }

    /// Stop the watcher and kill the preview server.
    pub fn shutdown(&self) {
        if let Ok(mut watch) = self.watch.lock() {
            watch.take();
        }
        if let Ok(mut server) = self.server.lock() {
            if let Some(mut child) = server.take() {
                let _ = child.start_kill();
            }
        }
    }
}
