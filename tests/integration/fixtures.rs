//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Creating a temporary project with the conventional source layout
//! - A deterministic fake toolchain
//! - Collecting scheduler events

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use sitepipe::config::Config;
use sitepipe::fileset::SourceFile;
use sitepipe::pipeline::Artifact;
use sitepipe::tasks::standard_registry;
use sitepipe::toolchain::Toolchain;
use sitepipe::{Error, Orchestrator, Result, SchedulerEvent};

/// Style sources containing this token fail linting.
pub const LINT_ERROR: &str = "LINT_ERROR";
/// Style sources containing this token pass linting but fail compilation.
pub const COMPILE_ERROR: &str = "COMPILE_ERROR";
/// Compiled CSS containing this token fails vendor prefixing.
pub const PREFIX_ERROR: &str = "PREFIX_ERROR";
/// Scripts containing this token fail transpilation.
pub const TRANSPILE_ERROR: &str = "TRANSPILE_ERROR";
/// Appended by the fake compiler and transpiler when source maps are requested.
pub const SOURCE_MAP: &str = "/*# sourceMappingURL=inline */";

pub const HEADER: &str = "<!doctype html><html><head>";
pub const FOOTER: &str = "</html>";
pub const PAGE: &str = "<main><img src=\"img/logo.png\"><img src=\"a.jpg\"></main>";

/// Deterministic stand-in for sass-lint, sass, postcss and babel.
#[derive(Debug, Default)]
pub struct FakeToolchain;

fn with_map(mut text: String, source_maps: bool) -> String {
    if source_maps {
        text.push('\n');
        text.push_str(SOURCE_MAP);
    }
    text
}

/// Fail like the named tool would when `text` carries `token`.
fn check(tool: &str, token: &str, path: &Path, text: &str) -> Result<()> {
    if text.contains(token) {
        return Err(Error::Tool {
            tool: tool.to_string(),
            status: "exit status: 1".to_string(),
            stderr: format!("{}: {} error", path.display(), tool),
        });
    }
    Ok(())
}

impl Toolchain for FakeToolchain {
    fn lint_style(&self, file: &SourceFile) -> Result<()> {
        let source = std::fs::read_to_string(&file.path)?;
        check("sass-lint", LINT_ERROR, &file.relative, &source)
    }

    fn compile_style(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact> {
        check("sass", COMPILE_ERROR, &file.relative, &source.text())?;
        let css = with_map(format!("/*compiled*/{}", source.text()), source_maps);
        Ok(Artifact::new(source.path, css))
    }

    fn prefix_style(&self, css: Artifact) -> Result<Artifact> {
        check("postcss", PREFIX_ERROR, &css.path, &css.text())?;
        let prefixed = format!("/*prefixed*/{}", css.text());
        Ok(Artifact::new(css.path, prefixed))
    }

    fn transpile_script(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact> {
        check("babel", TRANSPILE_ERROR, &file.relative, &source.text())?;
        let js = with_map(format!("/*es5*/{}", source.text()), source_maps);
        Ok(Artifact::new(source.path, js))
    }
}

/// A temporary project with sources for every task.
pub struct TestProject {
    /// Kept alive for the lifetime of the project.
    pub temp_dir: TempDir,
    /// Canonical project root.
    pub path: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");
        let project = Self { temp_dir, path };

        project.write("src/scss/style.scss", "body { color: $c; }");
        project.write("src/scss/_vars.scss", "$c: red;");
        project.write("src/js/app.js", "console.log('app');");
        project.write("src/js/lib/jquery-2.2.4.min.js", "/*jquery*/");
        project.write("src/js/lib/extra.js", "/*extra*/");
        project.write(
            "node_modules/magnific-popup/dist/jquery.magnific-popup.js",
            "/*popup*/",
        );
        project.write("src/index.html", PAGE);
        project.write("src/header.html", HEADER);
        project.write("src/footer.html", FOOTER);
        project.write("src/images/logo.png", "PNG");
        project.write("src/fonts/icons.woff", "WOFF");
        project.write("src/css/lib/reset.css", "* { margin: 0; }");
        project
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.path.join(relative)).unwrap();
    }

    pub fn dist(&self, relative: &str) -> PathBuf {
        self.path.join("dist").join(relative)
    }

    pub fn read_dist(&self, relative: &str) -> String {
        let path = self.dist(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.dist(relative).exists()
    }

    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator_with(Config::default())
    }

    pub fn orchestrator_with(&self, config: Config) -> Orchestrator {
        let registry = standard_registry().expect("standard registry is valid");
        Orchestrator::new(registry, config, &self.path, Arc::new(FakeToolchain))
    }

    /// Orchestrator whose events are collected on the returned receiver.
    pub fn observed(&self) -> (Orchestrator, mpsc::Receiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::channel(4096);
        (self.orchestrator().with_events(tx), rx)
    }
}

pub fn drain(rx: &mut mpsc::Receiver<SchedulerEvent>) -> Vec<SchedulerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn started_at(events: &[SchedulerEvent], name: &str) -> Option<usize> {
    events
        .iter()
        .position(|e| matches!(e, SchedulerEvent::TaskStarted { task } if task == name))
}

pub fn completed_at(events: &[SchedulerEvent], name: &str) -> Option<usize> {
    events
        .iter()
        .position(|e| matches!(e, SchedulerEvent::TaskCompleted { task, .. } if task == name))
}

pub fn start_count(events: &[SchedulerEvent], name: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SchedulerEvent::TaskStarted { task } if task == name))
        .count()
}

/// Assert that `before` finished before `after` started.
pub fn assert_before(events: &[SchedulerEvent], before: &str, after: &str) {
    let done = completed_at(events, before)
        .unwrap_or_else(|| panic!("'{}' never completed", before));
    let start = started_at(events, after)
        .unwrap_or_else(|| panic!("'{}' never started", after));
    assert!(done < start, "'{}' should finish before '{}' starts", before, after);
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
