//! Resolved filesystem layout.
//!
//! Tasks hand artifacts to each other through fixed paths in the output tree.
//! `Layout` is the single place those paths are spelled out.

use std::path::{Path, PathBuf};

use crate::config::PathTable;
use crate::fileset::FileSet;
use crate::Result;

pub const TMP_DIR: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct Layout {
    project: PathBuf,
    paths: PathTable,
}

impl Layout {
    pub fn new(project: impl Into<PathBuf>, paths: PathTable) -> Self {
        Self {
            project: project.into(),
            paths,
        }
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    pub fn src(&self) -> PathBuf {
        self.project.join(&self.paths.root)
    }

    pub fn dist(&self) -> PathBuf {
        self.project.join(&self.paths.dist)
    }

    fn src_pattern(&self, pattern: &str) -> String {
        match pattern.strip_prefix('!') {
            Some(rest) => format!("!{}/{}", self.paths.root, rest),
            None => format!("{}/{}", self.paths.root, pattern),
        }
    }

    fn dist_pattern(&self, pattern: &str) -> String {
        format!("{}/{}", self.paths.dist, pattern)
    }

    // ========== Source file-sets ==========

    pub fn scss(&self) -> Result<FileSet> {
        FileSet::new(&self.project, [self.src_pattern(&self.paths.scss)])
    }

    /// Application scripts: everything under the script root except the library directory.
    pub fn app_scripts(&self) -> Result<FileSet> {
        FileSet::new(
            &self.project,
            [
                format!("!{}", self.src_pattern(&self.paths.lib_js)),
                self.src_pattern(&self.paths.js),
            ],
        )
    }

    /// Vendor scripts: base library, declared modules, then the rest of the library directory.
    pub fn vendor_scripts(&self) -> Result<FileSet> {
        let mut patterns = vec![self.src_pattern(&self.paths.base_library)];
        patterns.extend(
            self.paths
                .modules
                .iter()
                .map(|m| format!("{}/{}", self.paths.modules_dir, m)),
        );
        patterns.push(self.src_pattern(&self.paths.lib_js));
        FileSet::new(&self.project, patterns)
    }

    pub fn html(&self) -> Result<FileSet> {
        FileSet::new(
            &self.project,
            self.paths.html.iter().map(|p| self.src_pattern(p)),
        )
    }

    pub fn page(&self) -> PathBuf {
        self.src().join(&self.paths.page)
    }

    pub fn static_files(&self) -> Result<FileSet> {
        Ok(FileSet::new(
            &self.project,
            self.paths.static_files.iter().map(|p| self.src_pattern(p)),
        )?
        .with_base(&self.paths.root))
    }

    pub fn lib_css(&self) -> Result<FileSet> {
        FileSet::new(&self.project, [self.src_pattern(&self.paths.lib_css)])
    }

    /// Sources whose changes trigger a rebuild in watch mode. Scripts are
    /// watched whole, library directory included.
    pub fn watched(&self) -> Result<Vec<FileSet>> {
        let scripts = FileSet::new(&self.project, [self.src_pattern(&self.paths.js)])?;
        Ok(vec![self.scss()?, scripts, self.html()?])
    }

    // ========== Output directories ==========

    pub fn css_dir(&self) -> PathBuf {
        self.dist().join("css")
    }

    pub fn js_dir(&self) -> PathBuf {
        self.dist().join("js")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.dist().join("html")
    }

    // ========== Artifacts ==========

    pub fn compiled_css(&self) -> PathBuf {
        self.css_dir().join("style.css")
    }

    pub fn app_bundle(&self) -> PathBuf {
        self.js_dir().join("bundle.js")
    }

    pub fn vendor_bundle(&self) -> PathBuf {
        self.js_dir().join("vendor.js")
    }

    pub fn combined_bundle(&self) -> PathBuf {
        self.js_dir().join("bundleVendor.js")
    }

    pub fn tagged_css(&self) -> PathBuf {
        self.css_dir().join(TMP_DIR).join("cssWithTag.css")
    }

    pub fn tagged_script(&self) -> PathBuf {
        self.js_dir().join(TMP_DIR).join("bundleVendorWithTag.js")
    }

    pub fn tagged_page(&self) -> PathBuf {
        self.html_dir().join("indexWithBodyTag.html")
    }

    /// Page copied verbatim by `copy-html`.
    pub fn copied_page(&self) -> PathBuf {
        self.html_dir().join(&self.paths.page)
    }

    pub fn header(&self) -> PathBuf {
        self.dist().join("header.html")
    }

    pub fn footer(&self) -> PathBuf {
        self.dist().join("footer.html")
    }

    pub fn single_file(&self) -> PathBuf {
        self.dist().join("index.html")
    }

    /// Inputs of the development single-file document, in assembly order.
    pub fn dev_assembly(&self) -> Vec<PathBuf> {
        vec![
            self.header(),
            self.tagged_css(),
            self.tagged_page(),
            self.tagged_script(),
            self.footer(),
        ]
    }

    /// Inputs of the production single-file document, in assembly order.
    pub fn prod_assembly(&self) -> Vec<PathBuf> {
        vec![
            self.header(),
            self.tagged_css(),
            self.copied_page(),
            self.tagged_script(),
            self.footer(),
        ]
    }

    // ========== Cleanup and rewrite targets ==========

    pub fn clean_patterns(&self) -> Vec<String> {
        vec![self.dist_pattern("**/*")]
    }

    pub fn staging_patterns(&self) -> Vec<String> {
        vec![
            self.dist_pattern(&format!("**/{}", TMP_DIR)),
            self.dist_pattern("**/header.html"),
            self.dist_pattern("**/footer.html"),
        ]
    }

    pub fn documents(&self) -> Result<FileSet> {
        FileSet::new(&self.project, [self.dist_pattern("**/*.html")])
    }
}
