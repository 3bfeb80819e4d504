//! External tools behind the style and script pipelines.
//!
//! The [`Toolchain`] trait is the seam between the task graph and the
//! programs that actually understand SCSS and JavaScript. The production
//! implementation shells out to the commands in [`ToolConfig`]; tests plug in
//! an in-process fake.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::config::{ToolCommand, ToolConfig};
use crate::fileset::SourceFile;
use crate::pipeline::Artifact;
use crate::{slog_debug, slog_trace, slog_warn, Error, Result};

pub trait Toolchain: Send + Sync {
    /// Lint one style source. An error means the file has lint violations.
    fn lint_style(&self, file: &SourceFile) -> Result<()>;

    /// Compile one style source to CSS. The returned artifact keeps the source path.
    fn compile_style(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact>;

    /// Add vendor prefixes to compiled CSS.
    fn prefix_style(&self, css: Artifact) -> Result<Artifact>;

    /// Transpile one script to the configured language level.
    fn transpile_script(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact>;
}

/// Runs the configured commands as child processes, feeding sources on stdin
/// and reading results from stdout.
#[derive(Debug, Clone)]
pub struct ExternalToolchain {
    tools: ToolConfig,
    cwd: PathBuf,
}

impl ExternalToolchain {
    pub fn new(tools: ToolConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            cwd: cwd.into(),
        }
    }

    fn run(
        &self,
        tool: &ToolCommand,
        extra_args: &[String],
        file: Option<&Path>,
        input: &[u8],
    ) -> Result<Vec<u8>> {
        let name = tool.display_name();
        let program =
            which::which(&tool.program).map_err(|_| Error::ToolNotFound(tool.program.clone()))?;

        let file_str = file.map(|f| f.display().to_string()).unwrap_or_default();
        let dir_str = file
            .and_then(Path::parent)
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        let mut args = tool.render_args(&[("file", &file_str), ("dir", &dir_str)]);
        args.extend(extra_args.iter().cloned());
        slog_debug!("Running {} {}", program.display(), args.join(" "));

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_vec();
            thread::spawn(move || match stdin.write_all(&input) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });

        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            handle
                .join()
                .map_err(|_| Error::TaskJoin(format!("{} stdin writer panicked", name)))??;
        }

        slog_trace!("{} stdout: {}", name, String::from_utf8_lossy(&output.stdout));
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let detail = [stdout, stderr]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::Tool {
                tool: name,
                status: output.status.to_string(),
                stderr: detail,
            });
        }
        if !stderr.is_empty() {
            slog_warn!("{}: {}", name, stderr);
        }
        Ok(output.stdout)
    }
}

impl Toolchain for ExternalToolchain {
    fn lint_style(&self, file: &SourceFile) -> Result<()> {
        let source = std::fs::read(&file.path)?;
        let report = self.run(&self.tools.lint, &[], Some(&file.path), &source)?;
        let report = String::from_utf8_lossy(&report);
        if !report.trim().is_empty() {
            slog_warn!("{}", report.trim());
        }
        Ok(())
    }

    fn compile_style(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact> {
        let extra: &[String] = if source_maps {
            &self.tools.style_source_map_args
        } else {
            &[]
        };
        let css = self.run(&self.tools.compile, extra, Some(&file.path), &source.contents)?;
        Ok(Artifact::new(source.path, css))
    }

    fn prefix_style(&self, css: Artifact) -> Result<Artifact> {
        let prefixed = self.run(&self.tools.prefix, &[], None, &css.contents)?;
        Ok(Artifact::new(css.path, prefixed))
    }

    fn transpile_script(
        &self,
        file: &SourceFile,
        source: Artifact,
        source_maps: bool,
    ) -> Result<Artifact> {
        let extra: &[String] = if source_maps {
            &self.tools.script_source_map_args
        } else {
            &[]
        };
        let js = self.run(&self.tools.transpile, extra, Some(&file.path), &source.contents)?;
        Ok(Artifact::new(source.path, js))
    }
}
