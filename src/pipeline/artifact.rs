use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::fileset::SourceFile;
use crate::{slog_debug, Error, Result};

/// File contents travelling between pipeline steps.
///
/// `path` is relative: it becomes the location below the destination
/// directory when the artifact is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read a file, reporting a missing file as [`Error::MissingInput`].
    pub fn read(path: &Path, relative: impl Into<PathBuf>) -> Result<Self> {
        match fs::read(path) {
            Ok(contents) => Ok(Self::new(relative, contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::MissingInput(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_source(file: &SourceFile) -> Result<Self> {
        Self::read(&file.path, file.relative.clone())
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    /// Replace the whole relative path.
    pub fn rename(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.path.set_extension(extension);
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Write below `dir`, creating parent directories. Returns the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(&self.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &self.contents)?;
        slog_debug!("Wrote {} ({} bytes)", target.display(), self.contents.len());
        Ok(target)
    }
}

/// Read every resolved file, in order.
pub fn read_all(files: &[SourceFile]) -> Result<Vec<Artifact>> {
    files.iter().map(Artifact::from_source).collect()
}

/// Read a fixed list of paths, each of which must exist.
pub fn read_required(paths: &[PathBuf]) -> Result<Vec<Artifact>> {
    paths
        .iter()
        .map(|path| {
            let name = path.file_name().map(PathBuf::from).unwrap_or_default();
            Artifact::read(path, name)
        })
        .collect()
}

/// Copy resolved files verbatim below `dest`, keeping their relative paths.
pub fn copy_files(files: &[SourceFile], dest: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = dest.join(&file.relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&file.path, &target)?;
        written.push(target);
    }
    slog_debug!("Copied {} file(s) to {}", written.len(), dest.display());
    Ok(written)
}
