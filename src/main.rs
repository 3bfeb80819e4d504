use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sitepipe::config::Config;
use sitepipe::tasks::{standard_registry, BUILD, DEFAULT};
use sitepipe::toolchain::ExternalToolchain;
use sitepipe::{slog, slog_debug, slog_error, Orchestrator, Result, SchedulerEvent};

/// sitepipe - builds a single self-contained HTML document from a
/// SCSS/JS/HTML source tree
#[derive(Parser, Debug)]
#[command(name = "sitepipe")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    SITEPIPE_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Task to run
    #[arg(default_value = DEFAULT)]
    pub target: String,

    /// Project directory (holds sitepipe.toml and the source tree)
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// List declared tasks and exit
    #[arg(long)]
    pub tasks: bool,

    /// List declared tasks as JSON and exit
    #[arg(long, conflicts_with = "tasks")]
    pub tasks_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    sitepipe::log::init_with_debug(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            slog_error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = standard_registry()?;

    if cli.tasks_json {
        println!("{}", serde_json::to_string_pretty(&registry.describe())?);
        return Ok(());
    }
    if cli.tasks {
        return print_tasks(&registry);
    }

    let project = std::fs::canonicalize(&cli.dir)?;
    let config = Config::load(&project)?;
    slog_debug!("Project: {}", project.display());

    let toolchain = Arc::new(ExternalToolchain::new(config.tools.clone(), &project));
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (tx, rx) = mpsc::channel(256);
        let printer = tokio::spawn(print_events(rx));
        let orchestrator =
            Orchestrator::new(registry, config, &project, toolchain).with_events(tx);

        let result = drive(&orchestrator, &cli.target).await;
        orchestrator.services().shutdown();
        drop(orchestrator);
        let _ = printer.await;
        result
    })
}

/// Run the target, then keep serving and rebuilding until interrupted if it
/// left services running.
async fn drive(orchestrator: &Orchestrator, target: &str) -> Result<()> {
    orchestrator.run(target).await?;

    if !orchestrator.services().is_active() {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    if orchestrator.services().is_watching() {
        orchestrator.watch_loop(BUILD, cancel).await?;
    } else {
        cancel.cancelled().await;
    }
    slog!("Shutting down");
    Ok(())
}

async fn print_events(mut rx: mpsc::Receiver<SchedulerEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            SchedulerEvent::TaskStarted { task } => slog!("Starting '{}'...", task),
            SchedulerEvent::TaskCompleted { task, elapsed } => {
                slog!("Finished '{}' after {} ms", task, elapsed.as_millis())
            }
            SchedulerEvent::TaskFailed { task, error } => {
                slog_error!("'{}' errored: {}", task, error)
            }
            SchedulerEvent::GroupComplete { sequence, index } => {
                slog_debug!("'{}' group {} complete", sequence, index + 1)
            }
        }
    }
}

/// One line per task, dependencies before the tasks that need them.
fn print_tasks(registry: &sitepipe::core::Registry) -> Result<()> {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    let graph = registry.graph()?;
    for name in graph.topological_order()? {
        let info = registry.get(name)?.info();
        let mut line = format!("{:<width$}  {}", info.name, info.description, width = width);
        if !info.prerequisites.is_empty() {
            line.push_str(&format!(" [after: {}]", info.prerequisites.join(", ")));
        }
        if let Some(sequence) = &info.sequence {
            let groups: Vec<String> = sequence
                .groups()
                .iter()
                .map(|g| {
                    if g.len() == 1 {
                        g[0].clone()
                    } else {
                        format!("({})", g.join(" | "))
                    }
                })
                .collect();
            line.push_str(&format!(" [{}]", groups.join(" -> ")));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}
