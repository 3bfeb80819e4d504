//! Orchestrator: runs tasks and sequences over the task graph.
//!
//! A target is scheduled as a group: the group's members plus all of their
//! transitive prerequisites form a DAG, and every task whose prerequisites
//! have completed is dispatched onto tokio's blocking pool. Sequence tasks
//! run their groups one after another, each as its own scheduling pass.
//!
//! The first failure stops dispatching. Tasks already running are awaited,
//! then the failure is returned and the rest of the sequence is skipped.

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::BuildContext;
use crate::core::{Profile, Registry, TaskBody, TaskGraph, TaskRun};
use crate::layout::Layout;
use crate::services::Services;
use crate::toolchain::Toolchain;
use crate::util::blocking;
use crate::{slog, slog_debug, slog_warn, Error, Result};

/// Events emitted by the orchestrator for task lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A task's prerequisites are done and its body has started.
    TaskStarted { task: String },
    /// A task finished successfully.
    TaskCompleted { task: String, elapsed: Duration },
    /// A task failed; the containing sequence stops.
    TaskFailed { task: String, error: String },
    /// Every task of one sequence group finished.
    GroupComplete { sequence: String, index: usize },
}

/// Runs named targets against a registry.
///
/// Cheap to clone; clones share the registry, services and run history.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<Registry>,
    config: Arc<Config>,
    layout: Arc<Layout>,
    toolchain: Arc<dyn Toolchain>,
    services: Arc<Services>,
    event_tx: Option<mpsc::Sender<SchedulerEvent>>,
    history: Arc<Mutex<Vec<TaskRun>>>,
}

impl Orchestrator {
    pub fn new(
        registry: Registry,
        config: Config,
        project: impl Into<PathBuf>,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        let layout = Layout::new(project, config.paths.clone());
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            layout: Arc::new(layout),
            toolchain,
            services: Arc::new(Services::new()),
            event_tx: None,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Emit [`SchedulerEvent`]s on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<SchedulerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Finished task records of the most recent `run`, in completion order.
    pub fn history(&self) -> Vec<TaskRun> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    async fn emit(&self, event: SchedulerEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run a single task or sequence by name, with its prerequisites.
    ///
    /// The profile comes from the target's declaration (development if none).
    pub async fn run(&self, target: &str) -> Result<()> {
        let task = self.registry.get(target)?;
        let profile = task.profile.unwrap_or_default();
        slog_debug!("Running '{}' ({} profile)", target, profile);
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
        let ctx = self.context(profile);
        self.run_group(vec![target.to_string()], ctx).await
    }

    fn context(&self, profile: Profile) -> Arc<BuildContext> {
        Arc::new(BuildContext {
            config: Arc::clone(&self.config),
            layout: Arc::clone(&self.layout),
            toolchain: Arc::clone(&self.toolchain),
            services: Arc::clone(&self.services),
            profile,
        })
    }

    /// Schedule one group and everything it transitively depends on.
    fn run_group(
        &self,
        members: Vec<String>,
        ctx: Arc<BuildContext>,
    ) -> BoxFuture<'static, Result<()>> {
        let this = self.clone();
        async move {
            let mut dag = this.registry.closure(&members)?;
            let mut completed: HashSet<String> = HashSet::new();
            let mut running: JoinSet<(String, Duration, Result<()>)> = JoinSet::new();
            let mut failure: Option<Error> = None;

            loop {
                if failure.is_none() {
                    let ready: Vec<String> = dag
                        .ready_tasks(&completed)
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    for name in ready {
                        dag.start_task(&name)?;
                        slog_debug!("Dispatching '{}'", name);
                        this.emit(SchedulerEvent::TaskStarted { task: name.clone() })
                            .await;
                        let job = this.execute(name.clone(), Arc::clone(&ctx));
                        running.spawn(async move {
                            let started = Instant::now();
                            let result = job.await;
                            (name, started.elapsed(), result)
                        });
                    }
                }

                let Some(joined) = running.join_next().await else {
                    break;
                };
                let (name, elapsed, result) =
                    joined.map_err(|e| Error::TaskJoin(e.to_string()))?;

                match result {
                    Ok(()) => {
                        dag.complete_task(&name)?;
                        completed.insert(name.clone());
                        this.emit(SchedulerEvent::TaskCompleted {
                            task: name.clone(),
                            elapsed,
                        })
                        .await;
                    }
                    Err(err) => {
                        let err = match err {
                            nested @ Error::TaskFailed { .. } => nested,
                            other => Error::TaskFailed {
                                task: name.clone(),
                                reason: other.to_string(),
                            },
                        };
                        slog_debug!("'{}' failed: {}", name, err);
                        dag.fail_task(&name, &err.to_string())?;
                        this.emit(SchedulerEvent::TaskFailed {
                            task: name.clone(),
                            error: err.to_string(),
                        })
                        .await;
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
                this.record(&dag, &name);
            }

            if let Some(err) = failure {
                return Err(err);
            }
            if !dag.all_complete(&completed) {
                return Err(Error::Validation(format!(
                    "{} task(s) could not be scheduled",
                    dag.pending_count(&completed)
                )));
            }
            Ok(())
        }
        .boxed()
    }

    fn record(&self, dag: &TaskGraph, name: &str) {
        if let (Some(run), Ok(mut history)) = (dag.get_task(name), self.history.lock()) {
            history.push(run.clone());
        }
    }

    /// Run one task body. Prerequisites are handled by the caller.
    fn execute(&self, name: String, ctx: Arc<BuildContext>) -> BoxFuture<'static, Result<()>> {
        let this = self.clone();
        async move {
            let task = this.registry.get(&name)?;
            match &task.body {
                TaskBody::Action(action) => {
                    let action = Arc::clone(action);
                    blocking(move || action(ctx.as_ref())).await
                }
                TaskBody::Sequence(sequence) => {
                    for (index, group) in sequence.groups().iter().enumerate() {
                        this.run_group(group.clone(), Arc::clone(&ctx)).await?;
                        this.emit(SchedulerEvent::GroupComplete {
                            sequence: name.clone(),
                            index,
                        })
                        .await;
                    }
                    Ok(())
                }
                TaskBody::Aggregate => Ok(()),
            }
        }
        .boxed()
    }

    /// Rerun `target` every time the watcher reports a source change, until
    /// `cancel` fires or the watcher goes away. Failed rebuilds are logged.
    pub async fn watch_loop(&self, target: &str, cancel: CancellationToken) -> Result<()> {
        let Some(mut changes) = self.services.take_changes() else {
            return Ok(());
        };

        loop {
            let path = tokio::select! {
                _ = cancel.cancelled() => break,
                next = changes.recv() => match next {
                    Some(path) => path,
                    None => break,
                },
            };

            let mut coalesced = 1;
            while changes.try_recv().is_ok() {
                coalesced += 1;
            }
            slog!(
                "'{}' changed ({} event(s)), rerunning '{}'",
                path.display(),
                coalesced,
                target
            );

            if let Err(e) = self.run(target).await {
                slog_warn!("Rebuild failed: {}", e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tasks", &self.registry.len())
            .field("project", &self.layout.project())
            .finish()
    }
}
