//! The declared task graph of a front-end build.
//!
//! Each submodule holds the action bodies for one stage of the pipeline.
//! [`standard_registry`] wires them together under their CLI names.

mod assemble;
mod assets;
mod cleanup;
mod markup;
mod script;
mod serve;
mod style;

use std::path::{Path, PathBuf};

use crate::core::{Profile, Registry, Sequence, Task};
use crate::pipeline::Artifact;
use crate::Result;

pub use cleanup::{remove_matching, CleanupReport};
pub use style::is_partial;

pub const CLEAN: &str = "clean";
pub const CLEAN_TMP: &str = "clean-tmp";
pub const SASS: &str = "sass";
pub const MIN_JS: &str = "min-js";
pub const MODULES: &str = "modules";
pub const HTML_TAG: &str = "html-tag";
pub const COPY_HTML: &str = "copy-html";
pub const STYLE_TAG: &str = "style-tag";
pub const SCRIPT_TAG: &str = "script-tag";
pub const COPY_STATIC: &str = "copy-static";
pub const COPY_LIB_CSS: &str = "copy-lib-css";
pub const SINGLE_FILE: &str = "single-file";
pub const SINGLE_FILE_PROD: &str = "single-file-prod";
pub const CHANGE_IMG_PATH: &str = "change-img-path";
pub const BUILD: &str = "build";
pub const PROD: &str = "prod";
pub const SERVE: &str = "serve";
pub const WATCH: &str = "watch";
pub const DEFAULT: &str = "default";

/// Write `artifact` at exactly `target`, whatever its current relative path.
fn emit(artifact: Artifact, target: &Path) -> Result<PathBuf> {
    let name = target.file_name().map(PathBuf::from).unwrap_or_default();
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    artifact.rename(name).write_to(dir)
}

pub fn build_sequence() -> Sequence {
    Sequence::new()
        .parallel(&[SCRIPT_TAG, HTML_TAG, STYLE_TAG])
        .then(SINGLE_FILE)
}

pub fn prod_sequence() -> Sequence {
    Sequence::new()
        .then(CLEAN)
        .parallel(&[SCRIPT_TAG, COPY_HTML, STYLE_TAG, COPY_STATIC])
        .then(SINGLE_FILE_PROD)
        .then(CLEAN_TMP)
        .then(CHANGE_IMG_PATH)
}

/// Every task a project build knows about.
pub fn standard_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    let tasks = vec![
        Task::action(CLEAN, cleanup::clean).describe("Delete everything in the output directory"),
        Task::action(CLEAN_TMP, cleanup::clean_tmp)
            .describe("Delete staging artifacts and copied fragments"),
        Task::action(SASS, style::sass).describe("Lint, compile and prefix stylesheets"),
        Task::action(MIN_JS, script::min_js).describe("Transpile and bundle application scripts"),
        Task::action(MODULES, script::modules).describe("Bundle third-party scripts"),
        Task::action(HTML_TAG, markup::html_tag).describe("Wrap the page in body tags"),
        Task::action(COPY_HTML, markup::copy_html).describe("Copy HTML pages"),
        Task::action(STYLE_TAG, style::style_tag)
            .after(&[SASS])
            .describe("Wrap compiled CSS in style tags"),
        Task::action(SCRIPT_TAG, script::script_tag)
            .after(&[MIN_JS, SASS, MODULES])
            .describe("Join vendor and app bundles and wrap them in script tags"),
        Task::action(COPY_STATIC, assets::copy_static).describe("Copy images, fonts and fragments"),
        Task::action(COPY_LIB_CSS, assets::copy_lib_css).describe("Copy library stylesheets"),
        Task::action(SINGLE_FILE, assemble::single_file)
            .describe("Assemble the development document"),
        Task::action(SINGLE_FILE_PROD, assemble::single_file_prod)
            .describe("Assemble the production document"),
        Task::action(CHANGE_IMG_PATH, assemble::change_img_path)
            .describe("Append markers to image extensions"),
        Task::sequence(BUILD, build_sequence()).describe("Development build"),
        Task::sequence(PROD, prod_sequence())
            .with_profile(Profile::Production)
            .describe("Production build"),
        Task::action(SERVE, serve::serve)
            .after(&[BUILD])
            .describe("Start the live-reloading preview server"),
        Task::action(WATCH, serve::watch)
            .after(&[SERVE])
            .describe("Rebuild when sources change"),
        Task::aggregate(DEFAULT).after(&[COPY_STATIC, BUILD, WATCH, SERVE]),
    ];
    for task in tasks {
        registry.register(task)?;
    }
    registry.validate()?;
    Ok(registry)
}
