use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{slog_debug, Result};

pub const CONFIG_FILE: &str = "sitepipe.toml";

/// Project configuration, read from `sitepipe.toml` at the project root.
///
/// Every field has a default matching the conventional layout, so a project
/// without a config file builds as-is.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathTable,
    #[serde(default)]
    pub tools: ToolConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub markers: Markers,
}

/// The path table. Source patterns are relative to `root`, module entries to
/// `modules_dir`, and every output lives under `dist`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathTable {
    pub root: String,
    pub dist: String,
    pub modules_dir: String,
    /// Third-party scripts placed right after the base library in the vendor bundle.
    pub modules: Vec<String>,
    /// Required first entry of the vendor bundle.
    pub base_library: String,
    pub scss: String,
    pub js: String,
    pub lib_js: String,
    pub lib_css: String,
    pub html: Vec<String>,
    /// Page wrapped in body tags for the development assembly.
    pub page: String,
    pub static_files: Vec<String>,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            dist: "dist".to_string(),
            modules_dir: "node_modules".to_string(),
            modules: vec!["magnific-popup/dist/jquery.magnific-popup.js".to_string()],
            base_library: "js/lib/jquery-2.2.4.min.js".to_string(),
            scss: "scss/**/*.scss".to_string(),
            js: "js/**/*.js".to_string(),
            lib_js: "js/lib/*.js".to_string(),
            lib_css: "css/lib/**/*.css".to_string(),
            html: vec![
                "**/*.html".to_string(),
                "!header.html".to_string(),
                "!footer.html".to_string(),
            ],
            page: "index.html".to_string(),
            static_files: vec![
                "images/**/*".to_string(),
                "fonts/**/*".to_string(),
                "footer.html".to_string(),
                "header.html".to_string(),
            ],
        }
    }
}

/// An external program plus its argument template.
///
/// Arguments may contain `{file}`, `{dir}` and `{dist}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Substitute `{name}` placeholders in every argument.
    pub fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (name, value)| {
                    acc.replace(&format!("{{{}}}", name), value)
                })
            })
            .collect()
    }

    /// Short display name used in logs and errors.
    pub fn display_name(&self) -> String {
        match (self.program.as_str(), self.args.first()) {
            ("npx", Some(first)) => first.clone(),
            (program, _) => program.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    pub lint: ToolCommand,
    pub compile: ToolCommand,
    pub prefix: ToolCommand,
    pub transpile: ToolCommand,
    pub server: ToolCommand,
    /// Appended to `compile` in development builds.
    pub style_source_map_args: Vec<String>,
    /// Appended to `transpile` in development builds.
    pub script_source_map_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            lint: ToolCommand::new("npx", &["sass-lint", "--verbose", "{file}"]),
            compile: ToolCommand::new("npx", &["sass", "--stdin", "--load-path", "{dir}"]),
            prefix: ToolCommand::new("npx", &["postcss", "--use", "autoprefixer"]),
            transpile: ToolCommand::new(
                "npx",
                &["babel", "--presets", "@babel/preset-env", "--filename", "{file}"],
            ),
            server: ToolCommand::new(
                "npx",
                &[
                    "browser-sync",
                    "start",
                    "--server",
                    "{dist}",
                    "--files",
                    "{dist}/**",
                    "--no-open",
                ],
            ),
            style_source_map_args: vec!["--embed-source-map".to_string()],
            script_source_map_args: vec!["--source-maps".to_string(), "inline".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Tokens appended after image extensions by `change-img-path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Markers {
    pub png: String,
    pub jpg: String,
    pub gif: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            png: "$ORIGIN_PNG$".to_string(),
            jpg: "$ORIGIN_JPG$".to_string(),
            gif: "$ORIGIN_GIF$".to_string(),
        }
    }
}

impl Config {
    pub fn config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = Self::config_path(project_dir);
        slog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            slog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        slog_debug!(
            "Config loaded: root={} dist={} modules={:?}",
            config.paths.root,
            config.paths.dist,
            config.paths.modules
        );
        Ok(config)
    }
}
